//! Status vocabulary shown to citizens.
//!
//! Keyed by the raw status string so legacy values stored by older clients
//! (`Pending`, `In Progress`, `PendingVerification`) still render.

type StatusTable = &'static [(&'static [&'static str], &'static str)];

const STATUS_LABELS: StatusTable = &[
    (&["Open", "Pending"], "OPEN — received, awaiting assignment"),
    (&["Progress", "In Progress"], "IN PROGRESS — being worked on"),
    (
        &["PendingVerification"],
        "PENDING VERIFICATION — visit site to confirm",
    ),
    (&["Resolved"], "RESOLVED — verified and closed"),
];

const NEXT_STEP_HINTS: StatusTable = &[
    (
        &["Open", "Pending"],
        "Next step: wait for a staff member to be assigned. You will be notified.",
    ),
    (
        &["Progress", "In Progress"],
        "Next step: staff are working on it. Hang tight!",
    ),
    (
        &["PendingVerification"],
        "Next step: visit the location and verify the repair on site to close this ticket and earn civic coins.",
    ),
    (
        &["Resolved"],
        "This ticket is fully resolved. Thank you for helping improve your community!",
    ),
];

fn lookup(table: StatusTable, status: &str) -> Option<&'static str> {
    let status = status.trim();
    table
        .iter()
        .find(|(keys, _)| keys.iter().any(|key| *key == status))
        .map(|(_, value)| *value)
}

/// Human-readable label; unknown statuses pass through unchanged.
pub fn status_label(status: &str) -> &str {
    lookup(STATUS_LABELS, status).unwrap_or(status)
}

/// Next-step hint for the status family, or an empty string.
pub fn next_step_hint(status: &str) -> &'static str {
    lookup(NEXT_STEP_HINTS, status).unwrap_or("")
}
