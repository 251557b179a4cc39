//! Antrian Server - Visitor Queue Management System
//!
//! REST API server for the service desk queue: submissions, lifecycle,
//! tracking, display board, and analytics.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use antrian_server::{api, config::AppConfig, repository::Repository, services::Services, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("antrian_server={},tower_http=debug", config.logging.level).into()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Antrian Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Initialize Redis connection for the rate limiter
    let redis_service =
        antrian_server::services::redis::RedisService::connect(&config.redis, config.rate_limit.clone())
            .await
            .expect("Failed to connect to Redis");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services =
        Services::new(repository, &config, redis_service).expect("Failed to create services");

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Periodic sweep of expired one-time links
    let sweeper = state.services.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = sweeper.links.cleanup_expired().await {
                tracing::warn!("Expired link cleanup failed: {}", e);
            }
        }
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes behind the Redis rate limiter: anything a visitor's
    // phone or the lobby display hits without credentials
    let public = Router::new()
        .route("/qr/exchange", post(api::links::exchange))
        .route("/qr/validate/:link_uuid", get(api::links::validate))
        .route("/queues/visitor/:link_uuid", post(api::queues::submit_visitor))
        .route("/track/:code", get(api::track::track))
        .route("/track/:code/skd", post(api::track::mark_skd))
        .route("/display", get(api::display::display_board))
        .route("/services", get(api::services::list_services))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::rate_limit,
        ));

    // Staff routes authenticate per-handler through the JWT extractor
    let staff = Router::new()
        // Authentication
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        // Staff users
        .route("/users", get(api::auth::list_users))
        .route("/users", post(api::auth::create_user))
        // Queues
        .route("/queues", get(api::queues::list_queues))
        .route("/queues/guest", post(api::queues::submit_guest))
        .route("/queues/:id", get(api::queues::get_queue))
        .route("/queues/:id/serve", post(api::queues::serve_queue))
        .route("/queues/:id/complete", post(api::queues::complete_queue))
        .route("/queues/:id/cancel", post(api::queues::cancel_queue))
        .route("/queues/:id/remind", post(api::queues::remind_queue))
        // Service catalog
        .route("/services", post(api::services::create_service))
        .route("/services/:id", get(api::services::get_service))
        .route("/services/:id", put(api::services::update_service))
        .route("/services/:id", delete(api::services::delete_service))
        // Notifications
        .route("/notifications", get(api::notifications::feed))
        .route("/notifications/unread", get(api::notifications::unread_count))
        .route("/notifications/:id/read", post(api::notifications::mark_read))
        .route("/notifications/read-all", post(api::notifications::mark_all_read))
        // Statistics
        .route("/stats/summary", get(api::stats::daily_summary))
        .route("/stats/services", get(api::stats::service_breakdown))
        .route("/stats/series", get(api::stats::time_series))
        // Exports
        .route("/export/queues", get(api::export::export_queues));

    let api_v1 = Router::new()
        .route("/health", get(api::health::health_check))
        .merge(public)
        .merge(staff)
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
