pub mod chat;
pub mod community;
pub mod index;
pub mod knowledge_base;
