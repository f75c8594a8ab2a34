use crate::ChatModel;
use app_config::AppConfig;
use app_error::AppError;
use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::*;

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str, // "system" | "user" | "assistant"
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessageOut {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Client for any server exposing `POST {base}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: i32,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        // Local servers usually run without a key.
        if !config.llm_token.trim().is_empty() {
            let token = header::HeaderValue::from_str(&format!("Bearer {}", &config.llm_token))
                .map_err(|e| AppError::internal(format!("{}", e)))?;
            headers.insert(header::AUTHORIZATION, token);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("{}", e)))?;

        Ok(Self {
            client,
            url: completions_url(&config.llm_base_url),
            model: config.llm_model.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

pub fn completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    async fn chat(
        &self,
        system_prompt: Option<&str>,
        user_prompt: &str,
    ) -> Result<String, AppError> {
        let mut messages: Vec<ChatMessage<'_>> = Vec::new();
        if let Some(sys) = system_prompt {
            if !sys.is_empty() {
                messages.push(ChatMessage {
                    role: "system",
                    content: sys,
                });
            }
        }
        messages.push(ChatMessage {
            role: "user",
            content: user_prompt,
        });

        let req = ChatRequest {
            model: &self.model,
            messages,
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            stream: Some(false),
        };

        let resp = self.client.post(&self.url).json(&req).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        if !status.is_success() {
            warn!("Chat completion failed with {}", status);
            return Err(AppError::upstream(format!(
                "Model server returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let answer = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if answer.trim().is_empty() {
            return Err(AppError::upstream("Chat answer is empty"));
        }

        Ok(answer)
    }
}
