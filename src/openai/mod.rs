//! # Language Model Integration
//!
//! Chat-completion access and the recommendation step built on it.
//!
//! [`ChatCompletion`] is the seam between the recommendation logic and the
//! vendor endpoint: [`OpenAiClient`] talks to an OpenAI compatible
//! `/chat/completions` API, tests substitute their own implementation.

mod recommend;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

use crate::{
    config::OpenAiConfig,
    types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage},
};

pub use recommend::{
    MAX_ATTEMPTS, RecommendError, Recommender, ReplyError, SYSTEM_PROMPT, build_messages,
    interpret_reply,
};

/// Failures of the upstream call itself, as opposed to unusable content.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("language model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("language model returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed language model response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Sends one completion request and returns the text of the first choice.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl ChatCompletion for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(format!(
                "{url}/chat/completions",
                url = self.config.api_url.trim_end_matches('/')
            ))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(operation = "chat_completion", status = status.as_u16(), %body, "language model rejected request");
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Malformed("missing choices[0].message.content".to_string()))?;

        debug!(operation = "chat_completion", chars = content.len(), "received completion");
        Ok(content.trim().to_string())
    }
}
