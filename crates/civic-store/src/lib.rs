//! Civic store abstractions and in-memory backend.
//!
//! The per-entity traits mirror the collaborators the lifecycle and the
//! assistant read through. `LifecycleStore` adds the atomic commit operations
//! that keep a transition's report mutation, audit entry, notifications and
//! coin grant all-or-nothing.

use async_trait::async_trait;
use thiserror::Error;

mod fixture;
mod memory;

pub use civic_types::{
    CoinGrant, Notification, Report, ReportId, ReportStatus, ReportUpdate, User, UserId, UserRole,
    Vote,
};
pub use fixture::StoreFixture;
pub use memory::InMemoryCivicStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report '{0}' not found")]
    ReportNotFound(ReportId),
    #[error("user '{0}' not found")]
    UserNotFound(UserId),
    #[error("notification '{0}' not found")]
    NotificationNotFound(u64),
    #[error("report '{report_id}' was modified concurrently (expected version {expected}, found {actual})")]
    VersionConflict {
        report_id: ReportId,
        expected: u64,
        actual: u64,
    },
    #[error("user '{user_id}' already voted for report '{report_id}'")]
    DuplicateVote { report_id: ReportId, user_id: UserId },
    #[error("backend failure: {0}")]
    Backend(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Everything one guarded transition writes, committed as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionCommit {
    /// New report state. `version` must still equal the stored version.
    pub report: Report,
    pub update: ReportUpdate,
    pub notifications: Vec<Notification>,
    pub reward: Option<CoinGrant>,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn find_report(&self, id: ReportId) -> StoreResult<Option<Report>>;

    /// Inserts when `report.id == 0`, otherwise replaces the stored report if
    /// its version still matches. Returns the stored copy with the bumped version.
    async fn save_report(&self, report: Report) -> StoreResult<Report>;

    async fn find_reports_by_user(&self, user_id: UserId) -> StoreResult<Vec<Report>>;

    async fn find_reports_by_assigned_staff(&self, staff_id: UserId)
        -> StoreResult<Vec<Report>>;
}

#[async_trait]
pub trait UpdateLogStore: Send + Sync {
    async fn append_update(&self, update: ReportUpdate) -> StoreResult<ReportUpdate>;

    async fn find_updates_by_report(
        &self,
        report_id: ReportId,
        most_recent_first: bool,
    ) -> StoreResult<Vec<ReportUpdate>>;
}

#[async_trait]
pub trait VoteStore: Send + Sync {
    async fn find_vote(&self, report_id: ReportId, user_id: UserId) -> StoreResult<Option<Vote>>;

    /// Fails with `DuplicateVote` when the pair already exists.
    async fn save_vote(&self, vote: Vote) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>>;

    async fn save_user(&self, user: User) -> StoreResult<User>;
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn create_notification(&self, user_id: UserId, text: &str)
        -> StoreResult<Notification>;
}

/// Read side of the notification inbox.
#[async_trait]
pub trait NotificationStore: NotificationSink {
    /// Most recent first.
    async fn find_notifications_by_user(&self, user_id: UserId) -> StoreResult<Vec<Notification>>;

    async fn find_unread_notifications(&self, user_id: UserId) -> StoreResult<Vec<Notification>> {
        Ok(self
            .find_notifications_by_user(user_id)
            .await?
            .into_iter()
            .filter(|notification| !notification.read)
            .collect())
    }

    async fn mark_notification_read(&self, notification_id: u64) -> StoreResult<()>;
}

/// Store contract used by the report lifecycle.
#[async_trait]
pub trait LifecycleStore:
    ReportStore + UpdateLogStore + VoteStore + UserStore + NotificationStore
{
    /// Inserts a freshly submitted report together with its notification.
    /// Fails with `UserNotFound` when the owner is unknown.
    async fn commit_submission(
        &self,
        report: Report,
        notification: Notification,
    ) -> StoreResult<Report>;

    /// Applies a guarded transition atomically.
    async fn commit_transition(&self, commit: TransitionCommit) -> StoreResult<Report>;

    /// Records a vote and bumps the report's upvote counter atomically.
    async fn commit_vote(&self, vote: Vote) -> StoreResult<Report>;
}
