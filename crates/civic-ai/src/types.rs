use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: text.into(),
        }
    }

    pub fn text_content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChatUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub message: Message,
    pub finish_reason: Option<String>,
    pub usage: ChatUsage,
}

#[derive(Debug, Error)]
pub enum CivicAiError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("retry deadline exceeded after {attempts} attempt(s)")]
    DeadlineExceeded { attempts: usize },
}

/// Completion backend the assistant delegates open-ended questions to.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CivicAiError>;
}

/// Stand-in used when no API key is configured; every call fails fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClient;

#[async_trait]
impl LlmClient for UnavailableClient {
    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, CivicAiError> {
        Err(CivicAiError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChatRequest, CivicAiError, LlmClient, Message, MessageRole, UnavailableClient};

    #[test]
    fn constructors_set_roles() {
        assert_eq!(Message::system("persona").role, MessageRole::System);
        assert_eq!(Message::user("hi").role, MessageRole::User);
        assert_eq!(Message::assistant("hello").text_content(), "hello");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[tokio::test]
    async fn unavailable_client_always_fails() {
        let error = UnavailableClient
            .complete(ChatRequest {
                model: "gpt-4o-mini".to_string(),
                messages: vec![Message::user("hello")],
                max_tokens: None,
                temperature: None,
            })
            .await
            .expect_err("no backend");
        assert!(matches!(error, CivicAiError::MissingApiKey));
    }
}
