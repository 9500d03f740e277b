use std::sync::Arc;
use std::time::Duration;

use civic_ai::{ChatRequest, LlmClient, Message};
use civic_core::{is_blank, log_preview};
use civic_store::ReportStore;
use civic_types::{ReportId, UserId};
use tracing::{debug, warn};

use crate::{
    compose_messages, extract_ticket_id, format_ticket_summary, AssistantResult, RuleEngine,
    TicketContextBuilder,
};

pub const BLANK_MESSAGE_REPLY: &str = "Please type a message before sending.";

pub const REFUSAL_REPLY: &str = "I'm sorry, I couldn't find that ticket or it doesn't belong to your account. Please check the ticket number and try again.";

/// Replies containing one of these are the provider apologising, not answering.
pub const DELEGATE_FAILURE_SENTINELS: [&str; 2] = ["temporarily unavailable", "trouble connecting"];

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    /// Hard ceiling on one delegate call, retries included.
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_output_tokens: 500,
            temperature: 0.7,
            request_timeout: Duration::from_secs(30),
        }
    }
}

pub struct AssistantDispatcher {
    contexts: TicketContextBuilder,
    delegate: Arc<dyn LlmClient>,
    rules: RuleEngine,
    config: AssistantConfig,
}

impl AssistantDispatcher {
    pub fn new(
        store: Arc<dyn ReportStore>,
        delegate: Arc<dyn LlmClient>,
        config: AssistantConfig,
    ) -> Self {
        Self {
            contexts: TicketContextBuilder::new(store),
            delegate,
            rules: RuleEngine::new(),
            config,
        }
    }

    /// Answers one citizen message. Only store failures surface as errors.
    pub async fn respond(&self, message: &str, user_id: Option<UserId>) -> AssistantResult<String> {
        if is_blank(message) {
            return Ok(BLANK_MESSAGE_REPLY.to_string());
        }
        debug!(?user_id, message = %log_preview(message), "assistant request");

        let Some(ticket_id) = extract_ticket_id(message) else {
            if let Some(reply) = self.try_delegate(compose_messages(message, None)).await {
                return Ok(reply);
            }
            let reply = self.rules.reply(message);
            debug!(rule = ?self.rules.matched_rule(message), "answered from rules");
            return Ok(reply.to_string());
        };

        let context = match self.contexts.build(ticket_id, user_id).await? {
            Ok(context) => context,
            Err(refusal) => {
                warn!(ticket_id, ?user_id, ?refusal, "ticket request refused");
                return Ok(REFUSAL_REPLY.to_string());
            }
        };

        if let Some(reply) = self.try_delegate(compose_messages(message, Some(&context))).await {
            return Ok(reply);
        }
        self.ticket_fallback(ticket_id, user_id).await
    }

    async fn ticket_fallback(
        &self,
        ticket_id: ReportId,
        user_id: Option<UserId>,
    ) -> AssistantResult<String> {
        // Re-read so the summary reflects the latest state, not the prompt's.
        match self.contexts.fetch_owned(ticket_id, user_id).await? {
            Ok(report) => {
                debug!(ticket_id, status = %report.status, "answered with ticket summary");
                Ok(format_ticket_summary(&report))
            }
            Err(refusal) => {
                warn!(ticket_id, ?refusal, "ticket disappeared before fallback");
                Ok(REFUSAL_REPLY.to_string())
            }
        }
    }

    async fn try_delegate(&self, messages: Vec<Message>) -> Option<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(self.config.max_output_tokens),
            temperature: Some(self.config.temperature),
        };

        let response =
            match tokio::time::timeout(self.config.request_timeout, self.delegate.complete(request))
                .await
            {
                Ok(Ok(response)) => response,
                Ok(Err(error)) => {
                    warn!(%error, "delegate failed; using local fallback");
                    return None;
                }
                Err(_) => {
                    warn!(
                        timeout_ms = self.config.request_timeout.as_millis() as u64,
                        "delegate timed out; using local fallback"
                    );
                    return None;
                }
            };

        let reply = response.message.text_content().trim();
        if reply.is_empty() {
            warn!("delegate returned an empty reply; using local fallback");
            return None;
        }
        let lowered = reply.to_lowercase();
        if DELEGATE_FAILURE_SENTINELS
            .iter()
            .any(|sentinel| lowered.contains(sentinel))
        {
            warn!(reply = %log_preview(reply), "delegate replied with a failure sentinel");
            return None;
        }
        Some(reply.to_string())
    }
}
