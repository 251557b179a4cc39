//! Error types for Antrian server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchQueue = 4,
    NoSuchService = 5,
    NoSuchUser = 6,
    BadValue = 7,
    NumberAssignmentFailed = 8,
    AlreadySubmitted = 9,
    InvalidTransition = 10,
    NotQueueOwner = 11,
    NoActiveService = 12,
    LinkExpired = 13,
    ServiceInUse = 14,
    ReminderFailure = 15,
    TooManyRequests = 16,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Lifecycle transition attempted from a status that does not permit it.
    /// Distinct from Conflict: it signals a logic problem on the caller side,
    /// not a transient race worth retrying.
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// Closing a serving queue requires superadmin or the assigned admin
    #[error("Not queue owner: {0}")]
    NotQueueOwner(String),

    /// Daily number allocation exhausted its retries
    #[error("Number assignment failed: {0}")]
    NumberAssignment(String),

    /// One-time form link was already consumed
    #[error("Link already used: {0}")]
    LinkUsed(String),

    /// One-time form link expired before use
    #[error("Link expired: {0}")]
    LinkExpired(String),

    /// Service still referenced by queue history
    #[error("Service in use: {0}")]
    ServiceInUse(String),

    /// No ACTIVE service available to receive the submission
    #[error("No active service: {0}")]
    NoActiveService(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    /// Pick the response body code. Some variants carry a more specific code
    /// than their HTTP status so the UI can branch without parsing messages.
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Authentication(_) | AppError::Authorization(_) => ErrorCode::NotAuthorized,
            AppError::NotQueueOwner(_) => ErrorCode::NotQueueOwner,
            AppError::NotFound(msg) if msg.contains("Service") => ErrorCode::NoSuchService,
            AppError::NotFound(msg) if msg.contains("User") || msg.contains("Admin") => {
                ErrorCode::NoSuchUser
            }
            AppError::NotFound(_) => ErrorCode::NoSuchQueue,
            AppError::Validation(_) | AppError::BadRequest(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::NumberAssignment(_) => ErrorCode::NumberAssignmentFailed,
            AppError::LinkUsed(_) => ErrorCode::AlreadySubmitted,
            AppError::LinkExpired(_) => ErrorCode::LinkExpired,
            AppError::ServiceInUse(_) => ErrorCode::ServiceInUse,
            AppError::NoActiveService(_) => ErrorCode::NoActiveService,
            AppError::Conflict(_) => ErrorCode::Failure,
            AppError::StateConflict(_) => ErrorCode::InvalidTransition,
            AppError::Internal(_) => ErrorCode::Failure,
            AppError::ExternalService(_) => ErrorCode::ReminderFailure,
            AppError::RateLimited(_) => ErrorCode::TooManyRequests,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Authorization(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::NotQueueOwner(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Conflict(msg)
            | AppError::StateConflict(msg)
            | AppError::NumberAssignment(msg)
            | AppError::LinkUsed(msg)
            | AppError::LinkExpired(msg)
            | AppError::ServiceInUse(msg)
            | AppError::NoActiveService(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::ExternalService(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_conflict_maps_to_conflict_status_with_transition_code() {
        let err = AppError::StateConflict("Queue 3 is COMPLETED".to_string());
        assert_eq!(err.code(), ErrorCode::InvalidTransition);
    }

    #[test]
    fn ownership_guard_failure_gets_owner_code() {
        let err = AppError::NotQueueOwner(
            "Only a superadmin or the assigned admin may close this queue".to_string(),
        );
        assert_eq!(err.code(), ErrorCode::NotQueueOwner);
    }

    #[test]
    fn exhausted_allocation_gets_number_assignment_code() {
        let err = AppError::NumberAssignment("Failed to assign a queue number".into());
        assert_eq!(err.code(), ErrorCode::NumberAssignmentFailed);
    }

    /// The body code comes from the variant, never from the message text
    #[test]
    fn codes_do_not_depend_on_message_wording() {
        assert_eq!(AppError::LinkUsed("x".into()).code(), ErrorCode::AlreadySubmitted);
        assert_eq!(AppError::LinkExpired("x".into()).code(), ErrorCode::LinkExpired);
        assert_eq!(AppError::ServiceInUse("x".into()).code(), ErrorCode::ServiceInUse);
        assert_eq!(AppError::NoActiveService("x".into()).code(), ErrorCode::NoActiveService);
        assert_eq!(AppError::NotQueueOwner("x".into()).code(), ErrorCode::NotQueueOwner);
        assert_eq!(AppError::Conflict("expired link wording".into()).code(), ErrorCode::Failure);
    }
}
