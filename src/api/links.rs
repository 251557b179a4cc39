//! QR exchange endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Deserialize, ToSchema)]
pub struct ExchangeRequest {
    /// The uuid encoded in the printed static QR code
    pub uuid: Uuid,
}

#[derive(Serialize, ToSchema)]
pub struct ExchangeResponse {
    /// One-time link uuid for the self-service form
    pub link_uuid: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Exchange the static QR code for a one-time form link
#[utoipa::path(
    post,
    path = "/qr/exchange",
    tag = "qr",
    request_body = ExchangeRequest,
    responses(
        (status = 201, description = "One-time link issued", body = ExchangeResponse),
        (status = 404, description = "Unknown QR code")
    )
)]
pub async fn exchange(
    State(state): State<crate::AppState>,
    Json(request): Json<ExchangeRequest>,
) -> AppResult<(StatusCode, Json<ExchangeResponse>)> {
    let link = state.services.links.exchange(request.uuid).await?;
    Ok((
        StatusCode::CREATED,
        Json(ExchangeResponse {
            link_uuid: link.uuid,
            expires_at: link.expires_at,
        }),
    ))
}

#[derive(Serialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    pub expires_at: DateTime<Utc>,
}

/// Check that a one-time link is still usable before showing the form
#[utoipa::path(
    get,
    path = "/qr/validate/{link_uuid}",
    tag = "qr",
    params(("link_uuid" = Uuid, Path, description = "One-time link uuid")),
    responses(
        (status = 200, description = "Link is usable", body = ValidateResponse),
        (status = 404, description = "Unknown link"),
        (status = 409, description = "Link already used or expired")
    )
)]
pub async fn validate(
    State(state): State<crate::AppState>,
    Path(link_uuid): Path<Uuid>,
) -> AppResult<Json<ValidateResponse>> {
    let link = state.services.links.validate(link_uuid).await?;
    Ok(Json(ValidateResponse {
        valid: true,
        expires_at: link.expires_at,
    }))
}
