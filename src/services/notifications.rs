//! Staff notification feed

use crate::{
    error::AppResult,
    models::{notification::Notification, user::UserClaims},
    repository::Repository,
};

const DEFAULT_FEED_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Recent notifications visible to the caller, newest first
    pub async fn feed(
        &self,
        claims: &UserClaims,
        limit: Option<i64>,
    ) -> AppResult<Vec<Notification>> {
        let limit = limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, 200);
        self.repository
            .notifications
            .list_for_user(claims.user_id, limit)
            .await
    }

    pub async fn unread_count(&self, claims: &UserClaims) -> AppResult<i64> {
        self.repository.notifications.count_unread(claims.user_id).await
    }

    pub async fn mark_read(&self, id: i32) -> AppResult<()> {
        self.repository.notifications.mark_read(id).await
    }

    pub async fn mark_all_read(&self, claims: &UserClaims) -> AppResult<u64> {
        self.repository.notifications.mark_all_read(claims.user_id).await
    }
}
