use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    LifecycleStore, Notification, NotificationSink, NotificationStore, Report, ReportId,
    ReportStore, ReportUpdate, StoreError, StoreFixture, StoreResult, TransitionCommit,
    UpdateLogStore, User, UserId, UserRole, UserStore, Vote, VoteStore,
};

/// In-memory implementation for tests and local experimentation.
///
/// A single write lock covers every table, so each `commit_*` call is atomic
/// with respect to all other operations on the store.
#[derive(Debug, Default)]
pub struct InMemoryCivicStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    reports: HashMap<ReportId, Report>,
    next_report_id: ReportId,
    updates: Vec<ReportUpdate>,
    votes: HashMap<(ReportId, UserId), Vote>,
    users: HashMap<UserId, User>,
    notifications: Vec<Notification>,
}

impl StoreInner {
    fn allocate_report_id(&mut self) -> ReportId {
        let floor = self.reports.keys().copied().max().unwrap_or(0);
        self.next_report_id = self.next_report_id.max(floor) + 1;
        self.next_report_id
    }

    fn insert_report(&mut self, mut report: Report) -> Report {
        report.id = self.allocate_report_id();
        report.version = 1;
        self.reports.insert(report.id, report.clone());
        report
    }

    fn replace_report(&mut self, mut report: Report) -> StoreResult<Report> {
        let stored = self
            .reports
            .get_mut(&report.id)
            .ok_or(StoreError::ReportNotFound(report.id))?;
        if stored.version != report.version {
            return Err(StoreError::VersionConflict {
                report_id: report.id,
                expected: report.version,
                actual: stored.version,
            });
        }

        report.version += 1;
        *stored = report.clone();
        Ok(report)
    }

    fn check_version(&self, report: &Report) -> StoreResult<()> {
        let stored = self
            .reports
            .get(&report.id)
            .ok_or(StoreError::ReportNotFound(report.id))?;
        if stored.version != report.version {
            return Err(StoreError::VersionConflict {
                report_id: report.id,
                expected: report.version,
                actual: stored.version,
            });
        }
        Ok(())
    }

    fn push_update(&mut self, mut update: ReportUpdate) -> ReportUpdate {
        update.id = self.updates.len() as u64 + 1;
        self.updates.push(update.clone());
        update
    }

    fn push_notification(&mut self, mut notification: Notification) -> Notification {
        notification.id = self.notifications.len() as u64 + 1;
        self.notifications.push(notification.clone());
        notification
    }
}

impl InMemoryCivicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with `fixture`, keeping fixture ids.
    pub fn with_fixture(fixture: StoreFixture) -> Self {
        let mut inner = StoreInner::default();
        for user in fixture.users {
            inner.users.insert(user.id, user);
        }
        for mut report in fixture.reports {
            report.version = report.version.max(1);
            inner.reports.insert(report.id, report);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }
}

#[async_trait]
impl ReportStore for InMemoryCivicStore {
    async fn find_report(&self, id: ReportId) -> StoreResult<Option<Report>> {
        let inner = self.inner.read().await;
        Ok(inner.reports.get(&id).cloned())
    }

    async fn save_report(&self, report: Report) -> StoreResult<Report> {
        let mut inner = self.inner.write().await;
        if report.id == 0 {
            return Ok(inner.insert_report(report));
        }
        inner.replace_report(report)
    }

    async fn find_reports_by_user(&self, user_id: UserId) -> StoreResult<Vec<Report>> {
        let inner = self.inner.read().await;
        let mut reports: Vec<Report> = inner
            .reports
            .values()
            .filter(|report| report.owner_id == user_id)
            .cloned()
            .collect();
        reports.sort_by_key(|report| report.id);
        Ok(reports)
    }

    async fn find_reports_by_assigned_staff(
        &self,
        staff_id: UserId,
    ) -> StoreResult<Vec<Report>> {
        let inner = self.inner.read().await;
        let mut reports: Vec<Report> = inner
            .reports
            .values()
            .filter(|report| report.assigned_staff_id == Some(staff_id))
            .cloned()
            .collect();
        reports.sort_by_key(|report| report.id);
        Ok(reports)
    }
}

#[async_trait]
impl UpdateLogStore for InMemoryCivicStore {
    async fn append_update(&self, update: ReportUpdate) -> StoreResult<ReportUpdate> {
        let mut inner = self.inner.write().await;
        if !inner.reports.contains_key(&update.report_id) {
            return Err(StoreError::ReportNotFound(update.report_id));
        }
        Ok(inner.push_update(update))
    }

    async fn find_updates_by_report(
        &self,
        report_id: ReportId,
        most_recent_first: bool,
    ) -> StoreResult<Vec<ReportUpdate>> {
        let inner = self.inner.read().await;
        // Ids follow append order, which is also creation order.
        let mut updates: Vec<ReportUpdate> = inner
            .updates
            .iter()
            .filter(|update| update.report_id == report_id)
            .cloned()
            .collect();
        if most_recent_first {
            updates.reverse();
        }
        Ok(updates)
    }
}

#[async_trait]
impl VoteStore for InMemoryCivicStore {
    async fn find_vote(&self, report_id: ReportId, user_id: UserId) -> StoreResult<Option<Vote>> {
        let inner = self.inner.read().await;
        Ok(inner.votes.get(&(report_id, user_id)).cloned())
    }

    async fn save_vote(&self, vote: Vote) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let key = (vote.report_id, vote.user_id);
        if inner.votes.contains_key(&key) {
            return Err(StoreError::DuplicateVote {
                report_id: vote.report_id,
                user_id: vote.user_id,
            });
        }
        inner.votes.insert(key, vote);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryCivicStore {
    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_users_by_role(&self, role: UserRole) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        let mut users: Vec<User> = inner
            .users
            .values()
            .filter(|user| user.role == role)
            .cloned()
            .collect();
        users.sort_by_key(|user| user.id);
        Ok(users)
    }

    async fn save_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl NotificationSink for InMemoryCivicStore {
    async fn create_notification(
        &self,
        user_id: UserId,
        text: &str,
    ) -> StoreResult<Notification> {
        let mut inner = self.inner.write().await;
        Ok(inner.push_notification(Notification::new(user_id, text)))
    }
}

#[async_trait]
impl NotificationStore for InMemoryCivicStore {
    async fn find_notifications_by_user(
        &self,
        user_id: UserId,
    ) -> StoreResult<Vec<Notification>> {
        let inner = self.inner.read().await;
        Ok(inner
            .notifications
            .iter()
            .rev()
            .filter(|notification| notification.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, notification_id: u64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let notification = inner
            .notifications
            .iter_mut()
            .find(|notification| notification.id == notification_id)
            .ok_or(StoreError::NotificationNotFound(notification_id))?;
        notification.read = true;
        Ok(())
    }
}

#[async_trait]
impl LifecycleStore for InMemoryCivicStore {
    async fn commit_submission(
        &self,
        report: Report,
        mut notification: Notification,
    ) -> StoreResult<Report> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&report.owner_id) {
            return Err(StoreError::UserNotFound(report.owner_id));
        }
        let stored = inner.insert_report(report);
        notification.user_id = stored.owner_id;
        inner.push_notification(notification);
        Ok(stored)
    }

    async fn commit_transition(&self, commit: TransitionCommit) -> StoreResult<Report> {
        let mut inner = self.inner.write().await;

        // Validate everything before the first write so a failure leaves no trace.
        inner.check_version(&commit.report)?;
        if let Some(reward) = commit.reward {
            if !inner.users.contains_key(&reward.user_id) {
                return Err(StoreError::UserNotFound(reward.user_id));
            }
        }

        let stored = inner.replace_report(commit.report)?;
        inner.push_update(commit.update);
        for notification in commit.notifications {
            inner.push_notification(notification);
        }
        if let Some(reward) = commit.reward {
            if let Some(user) = inner.users.get_mut(&reward.user_id) {
                user.civic_coins = user.civic_coins.saturating_add(reward.amount);
            }
        }
        Ok(stored)
    }

    async fn commit_vote(&self, vote: Vote) -> StoreResult<Report> {
        let mut inner = self.inner.write().await;
        let key = (vote.report_id, vote.user_id);

        if !inner.reports.contains_key(&vote.report_id) {
            return Err(StoreError::ReportNotFound(vote.report_id));
        }
        if !inner.users.contains_key(&vote.user_id) {
            return Err(StoreError::UserNotFound(vote.user_id));
        }
        if inner.votes.contains_key(&key) {
            return Err(StoreError::DuplicateVote {
                report_id: vote.report_id,
                user_id: vote.user_id,
            });
        }

        inner.votes.insert(key, vote);
        let report = inner
            .reports
            .get_mut(&key.0)
            .ok_or(StoreError::ReportNotFound(key.0))?;
        report.upvote_count = report.upvote_count.saturating_add(1);
        report.version += 1;
        Ok(report.clone())
    }
}
