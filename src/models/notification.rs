//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Notification event types emitted by queue lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    NewQueue,
    QueueServing,
    QueueCompleted,
    QueueCanceled,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewQueue => "NEW_QUEUE",
            NotificationType::QueueServing => "QUEUE_SERVING",
            NotificationType::QueueCompleted => "QUEUE_COMPLETED",
            NotificationType::QueueCanceled => "QUEUE_CANCELED",
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NEW_QUEUE" => Ok(NotificationType::NewQueue),
            "QUEUE_SERVING" => Ok(NotificationType::QueueServing),
            "QUEUE_COMPLETED" => Ok(NotificationType::QueueCompleted),
            "QUEUE_CANCELED" => Ok(NotificationType::QueueCanceled),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

impl sqlx::Type<Postgres> for NotificationType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for NotificationType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for NotificationType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Append-only notification row; only `is_read` is mutable
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i32,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    /// Targeted staff user, or NULL for a broadcast notification
    pub user_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Event emitted by the queue lifecycle; turned into a notification row
/// after the owning transaction commits.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub user_id: Option<i32>,
}
