//! Public display board endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::queue::QueueDetails,
    services::display::{with_change_detection, HashedPayload},
};

#[derive(Deserialize, IntoParams)]
pub struct DisplayQuery {
    /// Previous content hash for change detection
    pub hash: Option<String>,
}

/// Today's waiting and serving queues for the lobby display. Clients poll
/// with the previous hash and get an empty body when nothing changed.
#[utoipa::path(
    get,
    path = "/display",
    tag = "display",
    params(DisplayQuery),
    responses(
        (status = 200, description = "Display board", body = Object)
    )
)]
pub async fn display_board(
    State(state): State<crate::AppState>,
    Query(query): Query<DisplayQuery>,
) -> AppResult<Json<HashedPayload<Vec<QueueDetails>>>> {
    let board = state.services.queues.display_board().await?;
    Ok(Json(with_change_detection(board, query.hash.as_deref())?))
}
