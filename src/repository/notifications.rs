//! Notifications repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::notification::{Notification, NotificationEvent},
};

#[derive(Clone)]
pub struct NotificationsRepository {
    pool: Pool<Postgres>,
}

impl NotificationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append a notification row
    pub async fn create(&self, event: &NotificationEvent) -> AppResult<Notification> {
        Ok(sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (notification_type, title, message, is_read, user_id)
            VALUES ($1, $2, $3, false, $4)
            RETURNING *
            "#,
        )
        .bind(event.notification_type)
        .bind(&event.title)
        .bind(&event.message)
        .bind(event.user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Recent notifications visible to a staff user: broadcast rows plus rows
    /// targeted at them, newest first.
    pub async fn list_for_user(&self, user_id: i32, limit: i64) -> AppResult<Vec<Notification>> {
        Ok(sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id IS NULL OR user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn count_unread(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE is_read = false AND (user_id IS NULL OR user_id = $1)
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Mark one notification as read
    pub async fn mark_read(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Notification with id {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Mark all notifications visible to a user as read
    pub async fn mark_all_read(&self, user_id: i32) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE notifications SET is_read = true
            WHERE is_read = false AND (user_id IS NULL OR user_id = $1)
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
