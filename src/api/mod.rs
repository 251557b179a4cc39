//! API handlers for Antrian REST endpoints

pub mod auth;
pub mod display;
pub mod export;
pub mod health;
pub mod links;
pub mod notifications;
pub mod openapi;
pub mod queues;
pub mod services;
pub mod stats;
pub mod track;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated staff from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // Get the Authorization header
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        // Check for Bearer token
        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        // Validate JWT token using the secret from configuration
        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Rate limiting middleware for the public endpoints. The client is keyed by
/// the first X-Forwarded-For hop when present (the desk sits behind a reverse
/// proxy), falling back to the socket address.
pub async fn rate_limit(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client_ip = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| addr.ip().to_string());

    if state.services.redis.allow_request(&client_ip).await {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(client_ip = %client_ip, "Rate limit exceeded");
        Err(AppError::RateLimited(
            "Too many requests, please slow down".to_string(),
        ))
    }
}
