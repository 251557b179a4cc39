//! Antrian Visitor Queue Management System
//!
//! A Rust implementation of the Antrian queue management server for a public
//! statistics service desk, providing a REST JSON API for queue submissions,
//! the staff dashboard, and the lobby display board.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
