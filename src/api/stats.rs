//! Analytics endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::stats::{DailySummary, Granularity, ServiceBreakdown, TimeSeriesPoint},
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Defaults to today when omitted
    pub date: Option<NaiveDate>,
}

/// Status counts and mean service duration for one day
#[utoipa::path(
    get,
    path = "/stats/summary",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(SummaryQuery),
    responses(
        (status = 200, description = "Daily summary", body = DailySummary)
    )
)]
pub async fn daily_summary(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<DailySummary>> {
    let date = query.date.unwrap_or_else(|| state.services.queues.today());
    let summary = state.services.stats.daily_summary(date).await?;
    Ok(Json(summary))
}

#[derive(Deserialize, IntoParams)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Visitor counts per service over a date range
#[utoipa::path(
    get,
    path = "/stats/services",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(RangeQuery),
    responses(
        (status = 200, description = "Per-service breakdown", body = Vec<ServiceBreakdown>),
        (status = 400, description = "Inverted date range")
    )
)]
pub async fn service_breakdown(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<Vec<ServiceBreakdown>>> {
    let breakdown = state
        .services
        .stats
        .service_breakdown(query.from, query.to)
        .await?;
    Ok(Json(breakdown))
}

#[derive(Deserialize, IntoParams)]
pub struct SeriesQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub granularity: Option<Granularity>,
}

/// Visitor time series bucketed by day, week, or month
#[utoipa::path(
    get,
    path = "/stats/series",
    tag = "stats",
    security(("bearer_auth" = [])),
    params(SeriesQuery),
    responses(
        (status = 200, description = "Time series", body = Vec<TimeSeriesPoint>),
        (status = 400, description = "Inverted date range")
    )
)]
pub async fn time_series(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Json<Vec<TimeSeriesPoint>>> {
    let series = state
        .services
        .stats
        .time_series(
            query.from,
            query.to,
            query.granularity.unwrap_or(Granularity::Day),
        )
        .await?;
    Ok(Json(series))
}
