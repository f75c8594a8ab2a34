pub mod chat;

use app_error::AppError;
use async_trait::async_trait;

/// A chat-completion backend that turns a prompt into one answer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, system_prompt: Option<&str>, user_prompt: &str)
    -> Result<String, AppError>;
}

pub use chat::OpenAiCompatibleClient;
