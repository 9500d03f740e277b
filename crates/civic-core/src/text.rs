const LOG_PREVIEW_MAX_CHARS: usize = 80;

/// Returns true when `value` is empty or only whitespace.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Shortens citizen-supplied text before it is written to logs.
pub fn log_preview(value: &str) -> String {
    let mut chars = value.chars();
    let preview: String = chars.by_ref().take(LOG_PREVIEW_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}
