//! Shared data types for civic report handling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use civic_core::Coordinates;

/// Identifier of a report (ticket).
pub type ReportId = u64;
/// Identifier of a platform user.
pub type UserId = u64;

/// Error returned when a status transition is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusTransitionError {
    #[error("invalid report transition: {from} -> {to}")]
    Invalid { from: ReportStatus, to: ReportStatus },
}

/// Lifecycle state for a report.
///
/// Persisted values written by earlier clients used `Pending` and
/// `In Progress`; both still deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportStatus {
    #[default]
    #[serde(alias = "Pending")]
    Open,
    #[serde(alias = "In Progress")]
    Progress,
    Resolved,
    Closed,
}

impl ReportStatus {
    /// Returns true when the guarded lifecycle allows moving to `next`.
    ///
    /// `Progress -> Progress` is the only self-transition: it is how staff
    /// re-assignment is recorded.
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Progress)
                | (Self::Progress, Self::Progress)
                | (Self::Progress, Self::Resolved)
                | (Self::Resolved, Self::Closed)
        )
    }

    /// Returns an error if transitioning to `next` is not allowed.
    pub fn ensure_transition(self, next: Self) -> Result<(), StatusTransitionError> {
        if self.can_transition_to(next) {
            return Ok(());
        }

        Err(StatusTransitionError::Invalid {
            from: self,
            to: next,
        })
    }

    /// Returns true when no further guarded transition exists.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Progress => "Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Citizen-submitted civic issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub owner_id: UserId,
    pub title: String,
    /// Free-text location label typed by the citizen.
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default)]
    pub origin: Option<Coordinates>,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub assigned_staff_id: Option<UserId>,
    #[serde(default)]
    pub assigned_staff_name: Option<String>,
    #[serde(default)]
    pub proof_ref: Option<String>,
    #[serde(default)]
    pub resolution: Option<Coordinates>,
    #[serde(default)]
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expected_resolution_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub upvote_count: u32,
    /// Optimistic-concurrency token; bumped by every committed mutation.
    #[serde(default)]
    pub version: u64,
}

/// Input accepted by report submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReport {
    pub owner_id: UserId,
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub origin: Option<Coordinates>,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub expected_resolution_at: Option<DateTime<Utc>>,
}

impl Report {
    /// Builds an unsaved `Open` report; the store assigns `id` and `version`.
    pub fn from_submission(submission: NewReport) -> Self {
        Self {
            id: 0,
            owner_id: submission.owner_id,
            title: submission.title,
            location: submission.location,
            description: submission.description,
            category: submission.category,
            status: ReportStatus::Open,
            origin: submission.origin,
            image_ref: submission.image_ref,
            assigned_staff_id: None,
            assigned_staff_name: None,
            proof_ref: None,
            resolution: None,
            verified: false,
            created_at: Utc::now(),
            expected_resolution_at: submission.expected_resolution_at,
            upvote_count: 0,
            version: 0,
        }
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

/// Append-only audit entry written once per committed transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportUpdate {
    pub id: u64,
    pub report_id: ReportId,
    pub status: ReportStatus,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl ReportUpdate {
    /// Creates an unsaved entry; the update log assigns `id`.
    pub fn new(report_id: ReportId, status: ReportStatus, comment: impl Into<String>) -> Self {
        Self {
            id: 0,
            report_id,
            status,
            comment: comment.into(),
            created_at: Utc::now(),
        }
    }
}

/// One upvote, unique per (report, user).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub report_id: ReportId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    pub fn new(report_id: ReportId, user_id: UserId) -> Self {
        Self {
            report_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Citizen,
    Staff,
    Admin,
}

/// Platform account as seen by the lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub civic_coins: u64,
}

impl User {
    pub fn new(id: UserId, display_name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role,
            civic_coins: 0,
        }
    }
}

/// In-platform message addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub user_id: UserId,
    pub text: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unsaved, unread notification; the sink assigns `id`.
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            user_id,
            text: text.into(),
            read: false,
            created_at: Utc::now(),
        }
    }
}

/// Coins credited to a report owner on verified closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinGrant {
    pub user_id: UserId,
    pub amount: u64,
}
