use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::time::sleep;

use crate::{
    retry::{is_transient_status, is_transient_transport, retry_after, RetryPolicy},
    ChatRequest, ChatResponse, ChatUsage, CivicAiError, LlmClient, Message,
};

pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Base URL of an OpenAI-compatible endpoint, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    pub organization: Option<String>,
    /// Per-request HTTP timeout.
    pub request_timeout_ms: u64,
    pub max_retries: usize,
    /// Wall-clock limit for all attempts and backoff sleeps together. Set it to
    /// the assistant's delegate timeout so retries finish before the caller gives up.
    pub retry_deadline_ms: u64,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            api_key: api_key.into(),
            organization: None,
            request_timeout_ms: 30_000,
            max_retries: 2,
            retry_deadline_ms: 30_000,
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            deadline: Duration::from_millis(self.retry_deadline_ms.max(1)),
        }
    }
}

/// Chat-completions client for OpenAI-compatible providers.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, CivicAiError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(CivicAiError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                CivicAiError::InvalidResponse(format!("invalid API key header: {e}"))
            })?,
        );
        if let Some(org) = &config.organization {
            headers.insert(
                "OpenAI-Organization",
                HeaderValue::from_str(org).map_err(|e| {
                    CivicAiError::InvalidResponse(format!("invalid organization header: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    fn chat_completions_url(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        if base.ends_with("/chat/completions") {
            return base.to_string();
        }
        format!("{base}/chat/completions")
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CivicAiError> {
        let body = build_chat_request_body(&request);
        let url = self.chat_completions_url();
        let policy = self.config.retry_policy();
        let per_request = Duration::from_millis(self.config.request_timeout_ms.max(1));
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            // Each attempt gets whatever is left of the deadline, capped per request.
            let Some(left) = policy.remaining(started.elapsed()) else {
                return Err(CivicAiError::DeadlineExceeded {
                    attempts: attempt,
                });
            };
            let response = self
                .client
                .post(&url)
                .timeout(left.min(per_request))
                .header("x-civic-retry-attempt", attempt.to_string())
                .json(&body)
                .send()
                .await;

            let (error, hint) = match response {
                Ok(response) if response.status().is_success() => {
                    let raw = response.text().await?;
                    return parse_chat_response(&raw);
                }
                Ok(response) => {
                    let status = response.status();
                    let hint = retry_after(response.headers());
                    let raw = response.text().await?;
                    let error = CivicAiError::HttpStatus {
                        status: status.as_u16(),
                        body: raw,
                    };
                    if !is_transient_status(status) {
                        return Err(error);
                    }
                    (error, hint)
                }
                Err(error) if is_transient_transport(&error) => (CivicAiError::Http(error), None),
                Err(error) => return Err(CivicAiError::Http(error)),
            };

            let Some(delay) = policy.next_delay(attempt, started.elapsed(), hint) else {
                tracing::debug!(attempt, %error, "giving up on chat completion");
                return Err(error);
            };
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                %error,
                "retrying chat completion"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}

fn build_chat_request_body(request: &ChatRequest) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|message| {
            json!({
                "role": message.role.as_str(),
                "content": message.content,
            })
        })
        .collect();

    let mut body = json!({
        "model": request.model,
        "messages": messages,
    });
    if let Some(max_tokens) = request.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(temperature) = request.temperature {
        body["temperature"] = json!(temperature);
    }
    body
}

fn parse_chat_response(raw: &str) -> Result<ChatResponse, CivicAiError> {
    let parsed: OpenAiChatResponse = serde_json::from_str(raw)?;
    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CivicAiError::InvalidResponse("response contained no choices".to_string()))?;

    let usage = parsed
        .usage
        .map(|usage| ChatUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        message: Message::assistant(flatten_content(choice.message.content)),
        finish_reason: choice.finish_reason,
        usage,
    })
}

/// Accepts both the plain-string and the content-parts shapes.
fn flatten_content(content: Option<Value>) -> String {
    match content {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(Value::Array(parts)) => parts
            .iter()
            .filter(|part| {
                part.get("type")
                    .and_then(Value::as_str)
                    .map_or(true, |kind| kind == "text")
            })
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}
