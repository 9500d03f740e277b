use std::sync::Arc;

use chrono::{DateTime, Utc};
use civic_store::ReportStore;
use civic_types::{Report, ReportId, UserId};

use crate::{next_step_hint, status_label, AssistantResult};

const PLACEHOLDER: &str = "Not available";
const UNASSIGNED: &str = "Not yet assigned";
const TIMESTAMP_FORMAT: &str = "%d %b %Y, %I:%M %p";

/// Why a ticket could not be shown. Callers must not reveal which one applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    NotFound,
    Unauthorized,
}

/// Curated plain-text view of one report; the only report data the delegate sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextBlock {
    pub ticket_id: ReportId,
    pub text: String,
}

pub struct TicketContextBuilder {
    store: Arc<dyn ReportStore>,
}

impl TicketContextBuilder {
    pub fn new(store: Arc<dyn ReportStore>) -> Self {
        Self { store }
    }

    /// Loads the report and enforces ownership when a requesting user is known.
    pub async fn fetch_owned(
        &self,
        ticket_id: ReportId,
        requesting_user: Option<UserId>,
    ) -> AssistantResult<Result<Report, Refusal>> {
        let Some(report) = self.store.find_report(ticket_id).await? else {
            tracing::warn!(ticket_id, "ticket not found");
            return Ok(Err(Refusal::NotFound));
        };

        if let Some(user_id) = requesting_user {
            if !report.is_owned_by(user_id) {
                tracing::warn!(
                    ticket_id,
                    user_id,
                    owner_id = report.owner_id,
                    "ticket requested by a non-owner"
                );
                return Ok(Err(Refusal::Unauthorized));
            }
        }
        Ok(Ok(report))
    }

    pub async fn build(
        &self,
        ticket_id: ReportId,
        requesting_user: Option<UserId>,
    ) -> AssistantResult<Result<ContextBlock, Refusal>> {
        Ok(self
            .fetch_owned(ticket_id, requesting_user)
            .await?
            .map(|report| ContextBlock {
                ticket_id: report.id,
                text: render_context(&report),
            }))
    }
}

/// `dd Mon yyyy, hh:mm AM/PM` in UTC.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn safe(value: Option<&str>) -> &str {
    value
        .filter(|value| !value.trim().is_empty())
        .unwrap_or(PLACEHOLDER)
}

fn text_or_placeholder(value: &str) -> &str {
    safe(Some(value))
}

fn render_context(report: &Report) -> String {
    let fields = [
        ("Ticket ID", report.id.to_string()),
        ("Title", text_or_placeholder(&report.title).to_string()),
        ("Category", text_or_placeholder(&report.category).to_string()),
        ("Description", safe(report.description.as_deref()).to_string()),
        ("Location/Address", text_or_placeholder(&report.location).to_string()),
        ("Current Status", status_label(report.status.as_str()).to_string()),
        (
            "Assigned Agent",
            report
                .assigned_staff_name
                .as_deref()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(UNASSIGNED)
                .to_string(),
        ),
        (
            "Repair Proof",
            if report.proof_ref.is_some() {
                "Uploaded"
            } else {
                "Not yet uploaded"
            }
            .to_string(),
        ),
        (
            "Citizen Verified",
            if report.verified {
                "Yes"
            } else {
                "No, pending physical verification"
            }
            .to_string(),
        ),
        ("Submitted On", format_timestamp(&report.created_at)),
        (
            "Expected By",
            report
                .expected_resolution_at
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "Not set".to_string()),
        ),
        ("Upvotes", report.upvote_count.to_string()),
    ];

    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let mut block =
        String::from("=== TICKET CONTEXT (from civic records; do NOT make up additional details) ===\n");
    for (label, value) in fields {
        block.push_str(&format!("{label:<width$} : {value}\n"));
    }
    block.push_str(&"=".repeat(72));
    block.push('\n');
    block
}

/// Deterministic reply used when the delegate cannot answer a ticket question.
pub fn format_ticket_summary(report: &Report) -> String {
    let agent = report
        .assigned_staff_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNASSIGNED);
    let proof = if report.proof_ref.is_some() {
        "Uploaded"
    } else {
        "Not yet uploaded"
    };
    let verified = if report.verified {
        "Verified"
    } else {
        "Pending your physical verification"
    };

    let mut summary = format!(
        "Ticket #{id}: {title}\n\n\
         Category: {category}\n\
         Location: {location}\n\
         Status: {status}\n\
         Assigned Agent: {agent}\n\
         Repair Proof: {proof}\n\
         Citizen Verified: {verified}\n\
         Submitted: {submitted}",
        id = report.id,
        title = text_or_placeholder(&report.title),
        category = text_or_placeholder(&report.category),
        location = text_or_placeholder(&report.location),
        status = status_label(report.status.as_str()),
        submitted = format_timestamp(&report.created_at),
    );

    let hint = next_step_hint(report.status.as_str());
    if !hint.is_empty() {
        summary.push_str("\n\n");
        summary.push_str(hint);
    }
    summary
}
