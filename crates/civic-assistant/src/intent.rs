use std::sync::OnceLock;

use civic_types::ReportId;
use regex::Regex;

fn ticket_reference() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)(?:#|ticket\s*|complaint\s*|report\s*|id\s*)(\d+)").ok())
        .as_ref()
}

/// Returns the first ticket id referenced in `message`.
///
/// Recognised forms are `#12`, `ticket 12`, `complaint 12`, `report 12` and
/// `id 12`, case-insensitive and with any amount of whitespace (including
/// none) before the digits. A reference whose digits do not fit a ticket id
/// yields `None`.
pub fn extract_ticket_id(message: &str) -> Option<ReportId> {
    if message.trim().is_empty() {
        return None;
    }
    let captures = ticket_reference()?.captures(message)?;
    captures.get(1)?.as_str().parse().ok()
}
