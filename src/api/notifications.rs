//! Staff notification endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::notification::Notification,
    services::display::{with_change_detection, HashedPayload},
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct FeedQuery {
    /// Maximum rows to return, defaults to 50
    pub limit: Option<i64>,
    /// Previous content hash for change detection
    pub hash: Option<String>,
}

/// Notification feed for the authenticated staff user, with change detection
/// for the polling badge
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(FeedQuery),
    responses(
        (status = 200, description = "Notifications, newest first", body = Object)
    )
)]
pub async fn feed(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<HashedPayload<Vec<Notification>>>> {
    let notifications = state
        .services
        .notifications
        .feed(&claims, query.limit)
        .await?;
    Ok(Json(with_change_detection(
        notifications,
        query.hash.as_deref(),
    )?))
}

#[derive(Serialize, ToSchema)]
pub struct UnreadCount {
    pub unread: i64,
}

/// Unread notification count for the badge
#[utoipa::path(
    get,
    path = "/notifications/unread",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Unread count", body = UnreadCount)
    )
)]
pub async fn unread_count(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UnreadCount>> {
    let unread = state.services.notifications.unread_count(&claims).await?;
    Ok(Json(UnreadCount { unread }))
}

/// Mark one notification as read
#[utoipa::path(
    post,
    path = "/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 204, description = "Marked read"),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.notifications.mark_read(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mark every visible notification as read
#[utoipa::path(
    post,
    path = "/notifications/read-all",
    tag = "notifications",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "All marked read")
    )
)]
pub async fn mark_all_read(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.services.notifications.mark_all_read(&claims).await?;
    Ok(StatusCode::NO_CONTENT)
}
