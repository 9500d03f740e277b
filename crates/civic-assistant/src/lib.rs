//! Hybrid civic assistant.
//!
//! A message is scanned for a ticket reference, the referenced report is
//! rendered into a curated context block after an ownership check, and the
//! completion delegate is asked to answer. When the delegate fails or returns
//! one of its known apology sentinels the assistant answers locally: a
//! formatted ticket summary when a ticket was referenced, otherwise the first
//! matching canned rule.

mod context;
mod dispatcher;
mod intent;
mod labels;
mod prompt;
mod rules;

use civic_store::StoreError;
use thiserror::Error;

pub use context::{format_ticket_summary, format_timestamp, ContextBlock, Refusal, TicketContextBuilder};
pub use dispatcher::{
    AssistantConfig, AssistantDispatcher, BLANK_MESSAGE_REPLY, DELEGATE_FAILURE_SENTINELS,
    REFUSAL_REPLY,
};
pub use intent::extract_ticket_id;
pub use labels::{next_step_hint, status_label};
pub use prompt::{compose_messages, SYSTEM_PERSONA};
pub use rules::{RuleEngine, FALLBACK_REPLY};

pub type AssistantResult<T> = Result<T, AssistantError>;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("ticket lookup failed: {0}")]
    Store(#[from] StoreError),
}
