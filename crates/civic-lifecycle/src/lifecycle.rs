use std::sync::Arc;

use civic_core::{is_blank, Coordinates, ProximityCheck, DEFAULT_PROXIMITY_THRESHOLD_METERS};
use civic_store::{LifecycleStore, TransitionCommit};
use civic_types::{
    CoinGrant, NewReport, Notification, Report, ReportId, ReportStatus, ReportUpdate, User,
    UserId, UserRole, Vote,
};
use tracing::{info, warn};

use crate::{LifecycleError, LifecycleResult};

pub const DEFAULT_VERIFY_REWARD_COINS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleConfig {
    /// Maximum distance between the report origin and the acting party.
    pub proximity_threshold_meters: f64,
    /// Coins credited to the owner when a citizen verifies the repair.
    pub verify_reward_coins: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            proximity_threshold_meters: DEFAULT_PROXIMITY_THRESHOLD_METERS,
            verify_reward_coins: DEFAULT_VERIFY_REWARD_COINS,
        }
    }
}

/// Enforces the `Open -> Progress -> Resolved -> Closed` report lifecycle.
pub struct ReportLifecycle {
    store: Arc<dyn LifecycleStore>,
    config: LifecycleConfig,
}

impl ReportLifecycle {
    pub fn new(store: Arc<dyn LifecycleStore>, config: LifecycleConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Fetches a report, failing with `NotFound` when it does not exist.
    pub async fn fetch(&self, report_id: ReportId) -> LifecycleResult<Report> {
        self.store
            .find_report(report_id)
            .await?
            .ok_or(LifecycleError::NotFound {
                entity: "report",
                id: report_id,
            })
    }

    pub async fn submit(&self, submission: NewReport) -> LifecycleResult<Report> {
        for (field, value) in [
            ("title", submission.title.as_str()),
            ("location", submission.location.as_str()),
            ("category", submission.category.as_str()),
        ] {
            if is_blank(value) {
                return Err(LifecycleError::InvalidInput(format!(
                    "{field} must not be blank"
                )));
            }
        }
        if let Some(origin) = submission.origin {
            validate_coordinates(&origin)?;
        }

        let report = Report::from_submission(submission);
        let notification = Notification::new(
            report.owner_id,
            format!("New report '{}' submitted successfully!", report.title),
        );
        let owner_id = report.owner_id;
        let stored = self
            .store
            .commit_submission(report, notification)
            .await
            .map_err(|error| {
                warn!(owner_id, %error, "report submission rejected");
                LifecycleError::from(error)
            })?;
        info!(
            report_id = stored.id,
            owner_id = stored.owner_id,
            has_origin = stored.origin.is_some(),
            "report submitted"
        );
        Ok(stored)
    }

    /// Assigns (or re-assigns) staff and moves the report into `Progress`.
    ///
    /// `staff_id` must name a known user with the staff role.
    pub async fn assign(
        &self,
        report: &Report,
        staff_id: UserId,
        staff_name: &str,
    ) -> LifecycleResult<Report> {
        ensure_status(report, "assign", ReportStatus::Progress)?;
        if is_blank(staff_name) {
            return Err(LifecycleError::InvalidInput(
                "staff name must not be blank".to_string(),
            ));
        }

        let staff = self
            .store
            .find_user(staff_id)
            .await?
            .ok_or(LifecycleError::NotFound {
                entity: "user",
                id: staff_id,
            })?;
        if staff.role != UserRole::Staff {
            warn!(report_id = report.id, staff_id, role = ?staff.role, "assignee is not staff");
            return Err(LifecycleError::InvalidInput(format!(
                "user '{staff_id}' is not a staff member"
            )));
        }

        let staff_name = staff_name.trim();
        let mut next = report.clone();
        next.assigned_staff_id = Some(staff_id);
        next.assigned_staff_name = Some(staff_name.to_string());
        next.status = ReportStatus::Progress;

        let commit = TransitionCommit {
            update: ReportUpdate::new(
                report.id,
                ReportStatus::Progress,
                format!("Assigned to {staff_name}"),
            ),
            notifications: vec![
                Notification::new(
                    report.owner_id,
                    format!(
                        "Your report '{}' has been assigned to {staff_name}.",
                        report.title
                    ),
                ),
                Notification::new(
                    staff_id,
                    format!(
                        "You have been assigned report #{}: '{}'.",
                        report.id, report.title
                    ),
                ),
            ],
            reward: None,
            report: next,
        };
        self.commit(commit, "assign").await
    }

    /// Marks the repair done. Staff must be on site when the report has an origin.
    pub async fn resolve(
        &self,
        report: &Report,
        staff_location: Coordinates,
        proof_ref: Option<String>,
    ) -> LifecycleResult<Report> {
        ensure_status(report, "resolve", ReportStatus::Resolved)?;
        let check = self.check_proximity(report, &staff_location, "resolve")?;

        let mut next = report.clone();
        next.resolution = Some(staff_location);
        if let Some(proof_ref) = proof_ref.filter(|value| !is_blank(value)) {
            next.proof_ref = Some(proof_ref);
        }
        next.status = ReportStatus::Resolved;

        let comment = match check {
            Some(check) => format!(
                "Repair completed on site ({:.0} m from the reported location)",
                check.distance_meters
            ),
            None => "Repair completed; no reported location to compare against".to_string(),
        };
        let commit = TransitionCommit {
            update: ReportUpdate::new(report.id, ReportStatus::Resolved, comment),
            notifications: vec![Notification::new(
                report.owner_id,
                format!(
                    "Your report '{}' has been resolved. Please visit the site to verify the repair.",
                    report.title
                ),
            )],
            reward: None,
            report: next,
        };
        self.commit(commit, "resolve").await
    }

    /// Citizen confirms the repair on site; closes the report and pays the reward once.
    pub async fn verify(
        &self,
        report: &Report,
        citizen_location: Coordinates,
    ) -> LifecycleResult<Report> {
        ensure_status(report, "verify", ReportStatus::Closed)?;
        self.check_proximity(report, &citizen_location, "verify")?;

        let reward = (!report.verified && self.config.verify_reward_coins > 0).then_some(
            CoinGrant {
                user_id: report.owner_id,
                amount: self.config.verify_reward_coins,
            },
        );

        let mut next = report.clone();
        next.verified = true;
        next.status = ReportStatus::Closed;

        let owner_text = match reward {
            Some(grant) => format!(
                "Thanks for verifying '{}'! {} civic coins have been added to your balance.",
                report.title, grant.amount
            ),
            None => format!("Thanks for verifying '{}'! The report is now closed.", report.title),
        };
        let commit = TransitionCommit {
            update: ReportUpdate::new(
                report.id,
                ReportStatus::Closed,
                "Citizen verified the repair on site",
            ),
            notifications: vec![Notification::new(report.owner_id, owner_text)],
            reward,
            report: next,
        };
        self.commit(commit, "verify").await
    }

    /// Administrative override: sets any status without graph or geofence checks.
    pub async fn update_status_freeform(
        &self,
        report: &Report,
        status: ReportStatus,
        comment: &str,
    ) -> LifecycleResult<Report> {
        if !report.status.can_transition_to(status) {
            warn!(
                report_id = report.id,
                from = %report.status,
                to = %status,
                "administrative override outside the lifecycle graph"
            );
        }

        let mut next = report.clone();
        next.status = status;
        let commit = TransitionCommit {
            update: ReportUpdate::new(report.id, status, comment),
            notifications: vec![Notification::new(
                report.owner_id,
                format!("Your report '{}' status changed to {status}", report.title),
            )],
            reward: None,
            report: next,
        };
        self.commit(commit, "override").await
    }

    pub async fn vote(&self, report: &Report, user_id: UserId) -> LifecycleResult<Report> {
        let updated = self
            .store
            .commit_vote(Vote::new(report.id, user_id))
            .await
            .map_err(|error| {
                warn!(report_id = report.id, user_id, %error, "vote rejected");
                LifecycleError::from(error)
            })?;
        info!(
            report_id = updated.id,
            user_id,
            upvotes = updated.upvote_count,
            "vote recorded"
        );
        Ok(updated)
    }

    /// Audit trail, most recent first.
    pub async fn updates(&self, report_id: ReportId) -> LifecycleResult<Vec<ReportUpdate>> {
        Ok(self.store.find_updates_by_report(report_id, true).await?)
    }

    pub async fn reports_for_user(&self, user_id: UserId) -> LifecycleResult<Vec<Report>> {
        Ok(self.store.find_reports_by_user(user_id).await?)
    }

    pub async fn tasks_for_staff(&self, staff_id: UserId) -> LifecycleResult<Vec<Report>> {
        Ok(self.store.find_reports_by_assigned_staff(staff_id).await?)
    }

    pub async fn staff_directory(&self) -> LifecycleResult<Vec<User>> {
        Ok(self.store.find_users_by_role(UserRole::Staff).await?)
    }

    pub async fn notifications(&self, user_id: UserId) -> LifecycleResult<Vec<Notification>> {
        Ok(self.store.find_notifications_by_user(user_id).await?)
    }

    pub async fn unread_notifications(
        &self,
        user_id: UserId,
    ) -> LifecycleResult<Vec<Notification>> {
        Ok(self.store.find_unread_notifications(user_id).await?)
    }

    pub async fn mark_notification_read(&self, notification_id: u64) -> LifecycleResult<()> {
        Ok(self.store.mark_notification_read(notification_id).await?)
    }

    fn check_proximity(
        &self,
        report: &Report,
        actor: &Coordinates,
        action: &'static str,
    ) -> LifecycleResult<Option<ProximityCheck>> {
        validate_coordinates(actor)?;
        let Some(origin) = report.origin else {
            // Kept for reports filed without GPS; flagged for product review.
            warn!(
                report_id = report.id,
                action, "report has no origin coordinates; skipping proximity check"
            );
            return Ok(None);
        };

        let check = ProximityCheck::measure(&origin, actor, self.config.proximity_threshold_meters);
        if !check.passed() {
            warn!(
                report_id = report.id,
                action,
                distance_m = check.distance_meters,
                threshold_m = check.threshold_meters,
                "proximity check failed"
            );
            return Err(LifecycleError::OutOfRange {
                distance_meters: check.distance_meters,
                threshold_meters: check.threshold_meters,
            });
        }
        Ok(Some(check))
    }

    async fn commit(
        &self,
        commit: TransitionCommit,
        action: &'static str,
    ) -> LifecycleResult<Report> {
        let report_id = commit.report.id;
        let stored = self.store.commit_transition(commit).await.map_err(|error| {
            warn!(report_id, action, %error, "transition commit failed");
            LifecycleError::from(error)
        })?;
        info!(
            report_id,
            action,
            status = %stored.status,
            version = stored.version,
            "report transition committed"
        );
        Ok(stored)
    }
}

fn ensure_status(
    report: &Report,
    action: &'static str,
    target: ReportStatus,
) -> LifecycleResult<()> {
    report
        .status
        .ensure_transition(target)
        .map_err(|_| LifecycleError::InvalidTransition {
            report_id: report.id,
            action,
            status: report.status,
        })
}

fn validate_coordinates(point: &Coordinates) -> LifecycleResult<()> {
    let valid = point.latitude.is_finite()
        && point.longitude.is_finite()
        && (-90.0..=90.0).contains(&point.latitude)
        && (-180.0..=180.0).contains(&point.longitude);
    if valid {
        Ok(())
    } else {
        Err(LifecycleError::InvalidInput(format!(
            "coordinates ({}, {}) are out of range",
            point.latitude, point.longitude
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use civic_core::Coordinates;
    use civic_store::{
        InMemoryCivicStore, NotificationStore, ReportStore, StoreFixture, UserStore,
    };
    use civic_types::{NewReport, ReportStatus, User, UserRole};

    use super::{LifecycleConfig, ReportLifecycle};
    use crate::LifecycleError;

    const CITIZEN: u64 = 1;
    const STAFF: u64 = 2;
    const NEIGHBOUR: u64 = 3;
    const NIGHT_SHIFT_STAFF: u64 = 4;

    fn site() -> Coordinates {
        Coordinates::new(12.90, 77.58)
    }

    fn near_site() -> Coordinates {
        Coordinates::new(12.9005, 77.5805)
    }

    fn far_from_site() -> Coordinates {
        Coordinates::new(12.92, 77.60)
    }

    fn fixture() -> (Arc<InMemoryCivicStore>, ReportLifecycle) {
        let store = Arc::new(InMemoryCivicStore::with_fixture(StoreFixture {
            users: vec![
                User::new(CITIZEN, "Asha", UserRole::Citizen),
                User::new(STAFF, "Ravi", UserRole::Staff),
                User::new(NEIGHBOUR, "Meena", UserRole::Citizen),
                User::new(NIGHT_SHIFT_STAFF, "Kiran", UserRole::Staff),
            ],
            reports: Vec::new(),
        }));
        let lifecycle = ReportLifecycle::new(store.clone(), LifecycleConfig::default());
        (store, lifecycle)
    }

    fn pothole(origin: Option<Coordinates>) -> NewReport {
        NewReport {
            owner_id: CITIZEN,
            title: "Pothole near bus stop".to_string(),
            location: "MG Road".to_string(),
            description: Some("Deep pothole in the left lane".to_string()),
            category: "Roads".to_string(),
            origin,
            image_ref: None,
            expected_resolution_at: None,
        }
    }

    #[tokio::test]
    async fn functional_full_lifecycle_closes_report_and_pays_reward_once() {
        let (store, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");
        assert_eq!(report.status, ReportStatus::Open);

        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        assert_eq!(report.status, ReportStatus::Progress);
        assert_eq!(report.assigned_staff_name.as_deref(), Some("Ravi"));

        let report = lifecycle
            .resolve(&report, near_site(), Some("proof/42.jpg".to_string()))
            .await
            .expect("resolve");
        assert_eq!(report.status, ReportStatus::Resolved);
        assert_eq!(report.resolution, Some(near_site()));
        assert_eq!(report.proof_ref.as_deref(), Some("proof/42.jpg"));

        let report = lifecycle.verify(&report, near_site()).await.expect("verify");
        assert_eq!(report.status, ReportStatus::Closed);
        assert!(report.verified);

        let owner = store.find_user(CITIZEN).await.expect("read").expect("owner");
        assert_eq!(owner.civic_coins, 50);

        let updates = lifecycle.updates(report.id).await.expect("updates");
        let statuses: Vec<_> = updates.iter().map(|update| update.status).collect();
        assert_eq!(
            statuses,
            vec![
                ReportStatus::Closed,
                ReportStatus::Resolved,
                ReportStatus::Progress
            ]
        );

        let again = lifecycle.verify(&report, near_site()).await;
        assert!(matches!(
            again,
            Err(LifecycleError::InvalidTransition { action: "verify", .. })
        ));
        let owner = store.find_user(CITIZEN).await.expect("read").expect("owner");
        assert_eq!(owner.civic_coins, 50);
    }

    #[tokio::test]
    async fn submit_rejects_blank_required_fields() {
        let (_, lifecycle) = fixture();
        let mut submission = pothole(None);
        submission.category = "  ".to_string();

        let error = lifecycle.submit(submission).await.expect_err("blank category");
        assert!(matches!(error, LifecycleError::InvalidInput(message) if message.contains("category")));
        assert!(lifecycle.reports_for_user(CITIZEN).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn submit_notifies_owner() {
        let (store, lifecycle) = fixture();
        lifecycle.submit(pothole(None)).await.expect("submit");

        let inbox = store.find_notifications_by_user(CITIZEN).await.expect("inbox");
        assert_eq!(inbox.len(), 1);
        assert_eq!(
            inbox[0].text,
            "New report 'Pothole near bus stop' submitted successfully!"
        );
    }

    #[tokio::test]
    async fn regression_submit_rejects_unknown_owner() {
        let (store, lifecycle) = fixture();
        let mut submission = pothole(Some(site()));
        submission.owner_id = 77;

        let error = lifecycle.submit(submission).await.expect_err("unknown owner");
        assert!(matches!(error, LifecycleError::NotFound { entity: "user", id: 77 }));
        assert!(lifecycle.reports_for_user(77).await.expect("list").is_empty());
        assert!(store.find_report(1).await.expect("read").is_none());
    }

    #[tokio::test]
    async fn regression_assign_requires_known_staff_member() {
        let (store, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(None)).await.expect("submit");

        let error = lifecycle
            .assign(&report, 42, "Ghost")
            .await
            .expect_err("unknown staff");
        assert!(matches!(error, LifecycleError::NotFound { entity: "user", id: 42 }));

        let error = lifecycle
            .assign(&report, NEIGHBOUR, "Meena")
            .await
            .expect_err("citizen is not staff");
        assert!(matches!(
            error,
            LifecycleError::InvalidInput(message) if message.contains("not a staff member")
        ));

        let stored = store.find_report(report.id).await.expect("read").expect("report");
        assert_eq!(stored.status, ReportStatus::Open);
        assert_eq!(stored.assigned_staff_id, None);
        assert!(store
            .find_notifications_by_user(NEIGHBOUR)
            .await
            .expect("inbox")
            .is_empty());
    }

    #[tokio::test]
    async fn regression_reopened_report_never_pays_twice() {
        let (store, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        let report = lifecycle.resolve(&report, site(), None).await.expect("resolve");
        let report = lifecycle.verify(&report, site()).await.expect("verify");

        let report = lifecycle
            .update_status_freeform(&report, ReportStatus::Resolved, "Reopened for re-inspection")
            .await
            .expect("override");
        assert!(report.verified);

        let report = lifecycle.verify(&report, near_site()).await.expect("verify again");
        assert_eq!(report.status, ReportStatus::Closed);

        let owner = store.find_user(CITIZEN).await.expect("read").expect("owner");
        assert_eq!(owner.civic_coins, 50);
        let inbox = lifecycle.notifications(CITIZEN).await.expect("inbox");
        assert_eq!(
            inbox[0].text,
            "Thanks for verifying 'Pothole near bus stop'! The report is now closed."
        );
    }

    #[tokio::test]
    async fn assign_is_rejected_once_resolved() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        let report = lifecycle.resolve(&report, site(), None).await.expect("resolve");

        let error = lifecycle
            .assign(&report, STAFF, "Ravi")
            .await
            .expect_err("assign after resolve");
        assert!(matches!(
            error,
            LifecycleError::InvalidTransition {
                action: "assign",
                status: ReportStatus::Resolved,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reassignment_keeps_report_in_progress() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(None)).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        let report = lifecycle
            .assign(&report, NIGHT_SHIFT_STAFF, "Kiran")
            .await
            .expect("reassign");

        assert_eq!(report.status, ReportStatus::Progress);
        assert_eq!(report.assigned_staff_id, Some(NIGHT_SHIFT_STAFF));
        assert!(lifecycle.tasks_for_staff(STAFF).await.expect("tasks").is_empty());
        assert_eq!(
            lifecycle
                .tasks_for_staff(NIGHT_SHIFT_STAFF)
                .await
                .expect("tasks")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn resolve_requires_progress() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");

        let error = lifecycle
            .resolve(&report, site(), None)
            .await
            .expect_err("resolve while open");
        assert!(matches!(
            error,
            LifecycleError::InvalidTransition {
                action: "resolve",
                status: ReportStatus::Open,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn regression_out_of_range_resolve_writes_nothing() {
        let (store, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        let staff_inbox_before = store.find_notifications_by_user(STAFF).await.expect("inbox");

        let error = lifecycle
            .resolve(&report, far_from_site(), None)
            .await
            .expect_err("too far");
        match error {
            LifecycleError::OutOfRange {
                distance_meters,
                threshold_meters,
            } => {
                assert!(distance_meters > 2_000.0);
                assert_eq!(threshold_meters, 200.0);
            }
            other => panic!("unexpected error: {other}"),
        }

        let stored = store.find_report(report.id).await.expect("read").expect("report");
        assert_eq!(stored, report);
        assert_eq!(lifecycle.updates(report.id).await.expect("updates").len(), 1);
        assert_eq!(
            store.find_notifications_by_user(STAFF).await.expect("inbox"),
            staff_inbox_before
        );
    }

    #[tokio::test]
    async fn verify_out_of_range_pays_nothing() {
        let (store, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        let report = lifecycle.resolve(&report, site(), None).await.expect("resolve");

        let error = lifecycle
            .verify(&report, far_from_site())
            .await
            .expect_err("too far");
        assert!(matches!(error, LifecycleError::OutOfRange { .. }));

        let stored = store.find_report(report.id).await.expect("read").expect("report");
        assert_eq!(stored.status, ReportStatus::Resolved);
        assert!(!stored.verified);
        let owner = store.find_user(CITIZEN).await.expect("read").expect("owner");
        assert_eq!(owner.civic_coins, 0);
    }

    #[tokio::test]
    async fn missing_origin_skips_proximity_check() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(None)).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");

        let report = lifecycle
            .resolve(&report, far_from_site(), None)
            .await
            .expect("resolve without origin");
        assert_eq!(report.status, ReportStatus::Resolved);
    }

    #[tokio::test]
    async fn zero_reward_config_grants_nothing() {
        let (store, _) = fixture();
        let lifecycle = ReportLifecycle::new(
            store.clone(),
            LifecycleConfig {
                verify_reward_coins: 0,
                ..LifecycleConfig::default()
            },
        );
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");
        let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");
        let report = lifecycle.resolve(&report, site(), None).await.expect("resolve");
        lifecycle.verify(&report, site()).await.expect("verify");

        let owner = store.find_user(CITIZEN).await.expect("read").expect("owner");
        assert_eq!(owner.civic_coins, 0);
    }

    #[tokio::test]
    async fn stale_report_is_a_conflict() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(None)).await.expect("submit");
        lifecycle.vote(&report, NEIGHBOUR).await.expect("vote");

        let error = lifecycle
            .assign(&report, STAFF, "Ravi")
            .await
            .expect_err("stale copy");
        assert!(matches!(error, LifecycleError::Conflict(_)));
    }

    #[tokio::test]
    async fn votes_count_once_per_user() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(None)).await.expect("submit");

        let report = lifecycle.vote(&report, NEIGHBOUR).await.expect("vote");
        assert_eq!(report.upvote_count, 1);

        let error = lifecycle.vote(&report, NEIGHBOUR).await.expect_err("duplicate");
        assert!(matches!(error, LifecycleError::Conflict(_)));

        let error = lifecycle.vote(&report, 99).await.expect_err("unknown user");
        assert!(matches!(error, LifecycleError::NotFound { entity: "user", id: 99 }));
        assert_eq!(lifecycle.fetch(report.id).await.expect("fetch").upvote_count, 1);
    }

    #[tokio::test]
    async fn freeform_override_sets_any_status_and_notifies() {
        let (_, lifecycle) = fixture();
        let report = lifecycle.submit(pothole(Some(site()))).await.expect("submit");

        let report = lifecycle
            .update_status_freeform(&report, ReportStatus::Closed, "Duplicate of #3")
            .await
            .expect("override");
        assert_eq!(report.status, ReportStatus::Closed);

        let unread = lifecycle.unread_notifications(CITIZEN).await.expect("unread");
        assert_eq!(
            unread[0].text,
            "Your report 'Pothole near bus stop' status changed to Closed"
        );
        let updates = lifecycle.updates(report.id).await.expect("updates");
        assert_eq!(updates[0].comment, "Duplicate of #3");
    }

    #[tokio::test]
    async fn fetch_unknown_report_is_not_found() {
        let (_, lifecycle) = fixture();
        let error = lifecycle.fetch(404).await.expect_err("missing");
        assert_eq!(error.to_string(), "report '404' not found");
    }

    #[tokio::test]
    async fn notifications_can_be_marked_read() {
        let (_, lifecycle) = fixture();
        lifecycle.submit(pothole(None)).await.expect("submit");

        let inbox = lifecycle.notifications(CITIZEN).await.expect("inbox");
        lifecycle
            .mark_notification_read(inbox[0].id)
            .await
            .expect("mark read");
        assert!(lifecycle.unread_notifications(CITIZEN).await.expect("unread").is_empty());

        let error = lifecycle.mark_notification_read(999).await.expect_err("missing");
        assert!(matches!(error, LifecycleError::NotFound { entity: "notification", .. }));
    }

    #[tokio::test]
    async fn staff_directory_lists_staff_only() {
        let (_, lifecycle) = fixture();
        let staff = lifecycle.staff_directory().await.expect("staff");
        let names: Vec<_> = staff.iter().map(|user| user.display_name.as_str()).collect();
        assert_eq!(names, vec!["Ravi", "Kiran"]);
    }
}
