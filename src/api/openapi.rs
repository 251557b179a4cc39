//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, display, export, health, links, notifications, queues, services, stats, track};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Antrian API",
        version = "1.0.0",
        description = "Visitor Queue Management System REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Antrian Team", email = "dev@antrian.id")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::me,
        auth::create_user,
        auth::list_users,
        // Queues
        queues::submit_guest,
        queues::submit_visitor,
        queues::list_queues,
        queues::get_queue,
        queues::serve_queue,
        queues::complete_queue,
        queues::cancel_queue,
        queues::remind_queue,
        // QR links
        links::exchange,
        links::validate,
        // Public tracking
        track::track,
        track::mark_skd,
        // Display board
        display::display_board,
        // Services
        services::list_services,
        services::get_service,
        services::create_service,
        services::update_service,
        services::delete_service,
        // Notifications
        notifications::feed,
        notifications::unread_count,
        notifications::mark_read,
        notifications::mark_all_read,
        // Stats
        stats::daily_summary,
        stats::service_breakdown,
        stats::time_series,
        // Export
        export::export_queues,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::Role,
            // Queues
            crate::models::queue::Queue,
            crate::models::queue::QueueDetails,
            crate::models::queue::QueueStatus,
            crate::models::queue::QueueType,
            crate::models::queue::VisitPurpose,
            crate::models::queue::GuestSubmission,
            crate::models::queue::VisitorSubmission,
            crate::models::queue::SubmissionResult,
            queues::RemindRequest,
            // QR links
            links::ExchangeRequest,
            links::ExchangeResponse,
            links::ValidateResponse,
            // Services
            crate::models::service::Service,
            crate::models::service::ServiceStatus,
            crate::models::service::CreateService,
            crate::models::service::UpdateService,
            // Notifications
            crate::models::notification::Notification,
            crate::models::notification::NotificationType,
            notifications::UnreadCount,
            // Stats
            crate::models::stats::DailySummary,
            crate::models::stats::ServiceBreakdown,
            crate::models::stats::TimeSeriesPoint,
            crate::models::stats::Granularity,
            // Export
            export::ExportFormat,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "queues", description = "Queue submission and lifecycle"),
        (name = "qr", description = "QR code exchange for one-time form links"),
        (name = "track", description = "Public queue tracking"),
        (name = "display", description = "Public display board"),
        (name = "services", description = "Service catalog"),
        (name = "notifications", description = "Staff notifications"),
        (name = "stats", description = "Visitor analytics"),
        (name = "export", description = "Queue history exports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
