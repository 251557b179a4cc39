//! Analytics response types

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// Today's dashboard summary
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total: i64,
    pub waiting: i64,
    pub serving: i64,
    pub completed: i64,
    pub canceled: i64,
    /// Mean COMPLETED service duration in seconds, None when nothing completed
    pub avg_service_seconds: Option<f64>,
}

/// Per-service visitor counts over a period
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ServiceBreakdown {
    pub service_id: i32,
    pub service_name: String,
    pub total: i64,
    pub completed: i64,
}

/// One bucket of the visitor time series
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TimeSeriesPoint {
    /// First day of the bucket (day, ISO week, or month)
    pub bucket: NaiveDate,
    pub total: i64,
}

/// Time series granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Postgres date_trunc field name
    pub fn trunc_field(&self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }
}
