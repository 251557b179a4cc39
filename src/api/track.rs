//! Public queue tracking endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, models::queue::QueueDetails};

/// Track a queue entry by its opaque code; no authentication
#[utoipa::path(
    get,
    path = "/track/{code}",
    tag = "track",
    params(("code" = String, Path, description = "Tracking code from the submission")),
    responses(
        (status = 200, description = "Queue entry", body = QueueDetails),
        (status = 404, description = "Unknown tracking code")
    )
)]
pub async fn track(
    State(state): State<crate::AppState>,
    Path(code): Path<String>,
) -> AppResult<Json<QueueDetails>> {
    let details = state.services.queues.track(&code).await?;
    Ok(Json(details))
}

/// Record that the visitor filled the SKD satisfaction survey
#[utoipa::path(
    post,
    path = "/track/{code}/skd",
    tag = "track",
    params(("code" = String, Path, description = "Tracking code from the submission")),
    responses(
        (status = 204, description = "Flag recorded"),
        (status = 404, description = "Unknown tracking code")
    )
)]
pub async fn mark_skd(
    State(state): State<crate::AppState>,
    Path(code): Path<String>,
) -> AppResult<StatusCode> {
    state.services.queues.mark_skd_filled(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}
