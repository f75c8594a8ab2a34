pub mod community;
pub mod knowledge;
