use civic_store::StoreError;
use civic_types::{ReportId, ReportStatus};
use thiserror::Error;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("cannot {action} report '{report_id}' while it is {status}")]
    InvalidTransition {
        report_id: ReportId,
        action: &'static str,
        status: ReportStatus,
    },
    #[error("location is {distance_meters:.1} m from the report origin (limit {threshold_meters:.1} m)")]
    OutOfRange {
        distance_meters: f64,
        threshold_meters: f64,
    },
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::ReportNotFound(id) => Self::NotFound {
                entity: "report",
                id,
            },
            StoreError::UserNotFound(id) => Self::NotFound { entity: "user", id },
            StoreError::NotificationNotFound(id) => Self::NotFound {
                entity: "notification",
                id,
            },
            StoreError::DuplicateVote { report_id, user_id } => Self::Conflict(format!(
                "user '{user_id}' already voted for report '{report_id}'"
            )),
            StoreError::VersionConflict { report_id, .. } => Self::Conflict(format!(
                "report '{report_id}' changed since it was read; reload and retry"
            )),
            other => Self::Store(other),
        }
    }
}
