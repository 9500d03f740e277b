//! Chat-completion client used by the civic assistant.
mod openai;
mod retry;
mod types;

pub use openai::{OpenAiClient, OpenAiConfig, DEFAULT_OPENAI_API_BASE};
pub use types::{
    ChatRequest, ChatResponse, ChatUsage, CivicAiError, LlmClient, Message, MessageRole,
    UnavailableClient,
};
