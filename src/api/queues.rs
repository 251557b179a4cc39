//! Queue submission and lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::queue::{
        GuestSubmission, Queue, QueueDetails, QueueQuery, SubmissionResult, VisitorSubmission,
    },
    services::display::{with_change_detection, HashedPayload},
};

use super::AuthenticatedUser;

/// Staff guest book entry for a walk-in visitor
#[utoipa::path(
    post,
    path = "/queues/guest",
    tag = "queues",
    security(("bearer_auth" = [])),
    request_body = GuestSubmission,
    responses(
        (status = 201, description = "Queue entry created", body = SubmissionResult),
        (status = 400, description = "Invalid submission"),
        (status = 409, description = "No active service, or number allocation failed")
    )
)]
pub async fn submit_guest(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<GuestSubmission>,
) -> AppResult<(StatusCode, Json<SubmissionResult>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = state.services.queues.submit_guest(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Self-service visitor submission through a one-time link
#[utoipa::path(
    post,
    path = "/queues/visitor/{link_uuid}",
    tag = "queues",
    params(
        ("link_uuid" = Uuid, Path, description = "One-time link from the QR exchange")
    ),
    request_body = VisitorSubmission,
    responses(
        (status = 201, description = "Queue entry created", body = SubmissionResult),
        (status = 400, description = "Invalid submission"),
        (status = 404, description = "Unknown link"),
        (status = 409, description = "Link already used or expired")
    )
)]
pub async fn submit_visitor(
    State(state): State<crate::AppState>,
    Path(link_uuid): Path<Uuid>,
    Json(request): Json<VisitorSubmission>,
) -> AppResult<(StatusCode, Json<SubmissionResult>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let result = state
        .services
        .queues
        .submit_visitor(link_uuid, request)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Staff queue list with change detection. Pass the previous response's hash
/// to receive an empty body when nothing changed.
#[utoipa::path(
    get,
    path = "/queues",
    tag = "queues",
    security(("bearer_auth" = [])),
    params(QueueQuery),
    responses(
        (status = 200, description = "Queues for the day", body = Object)
    )
)]
pub async fn list_queues(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<QueueQuery>,
) -> AppResult<Json<HashedPayload<Vec<QueueDetails>>>> {
    let queues = state
        .services
        .queues
        .list(query.date, query.status, query.service_id)
        .await?;
    Ok(Json(with_change_detection(queues, query.hash.as_deref())?))
}

/// Single queue entry by id
#[utoipa::path(
    get,
    path = "/queues/{id}",
    tag = "queues",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Queue ID")),
    responses(
        (status = 200, description = "Queue entry", body = Queue),
        (status = 404, description = "Queue not found")
    )
)]
pub async fn get_queue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Queue>> {
    let queue = state.services.queues.get(id).await?;
    Ok(Json(queue))
}

/// Start serving a waiting queue entry
#[utoipa::path(
    post,
    path = "/queues/{id}/serve",
    tag = "queues",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Queue ID")),
    responses(
        (status = 200, description = "Queue now serving", body = Queue),
        (status = 404, description = "Queue or admin user not found"),
        (status = 409, description = "Queue is not WAITING")
    )
)]
pub async fn serve_queue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Queue>> {
    let queue = state.services.queues.serve(id, &claims).await?;
    Ok(Json(queue))
}

/// Complete a serving queue entry (superadmin or the assigned admin)
#[utoipa::path(
    post,
    path = "/queues/{id}/complete",
    tag = "queues",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Queue ID")),
    responses(
        (status = 200, description = "Queue completed", body = Queue),
        (status = 403, description = "Not the assigned admin"),
        (status = 409, description = "Queue is not SERVING")
    )
)]
pub async fn complete_queue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Queue>> {
    let queue = state.services.queues.complete(id, &claims).await?;
    Ok(Json(queue))
}

/// Cancel a waiting or serving queue entry
#[utoipa::path(
    post,
    path = "/queues/{id}/cancel",
    tag = "queues",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Queue ID")),
    responses(
        (status = 200, description = "Queue canceled", body = Queue),
        (status = 403, description = "Not the assigned admin"),
        (status = 409, description = "Queue is already closed")
    )
)]
pub async fn cancel_queue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Queue>> {
    let queue = state.services.queues.cancel(id, &claims).await?;
    Ok(Json(queue))
}

#[derive(Deserialize, ToSchema)]
pub struct RemindRequest {
    /// Custom message; a default announcement is sent when omitted
    pub message: Option<String>,
}

/// Send a WhatsApp reminder to the visitor of a queue entry
#[utoipa::path(
    post,
    path = "/queues/{id}/remind",
    tag = "queues",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Queue ID")),
    request_body = RemindRequest,
    responses(
        (status = 204, description = "Reminder sent"),
        (status = 400, description = "No usable phone number"),
        (status = 502, description = "Reminder gateway failed")
    )
)]
pub async fn remind_queue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<RemindRequest>,
) -> AppResult<StatusCode> {
    state
        .services
        .reminder
        .remind_queue(id, request.message)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
