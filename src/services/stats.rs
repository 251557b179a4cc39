//! Visitor analytics

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::stats::{DailySummary, Granularity, ServiceBreakdown, TimeSeriesPoint},
    repository::Repository,
};

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Status counts and mean service duration for one day
    pub async fn daily_summary(&self, date: NaiveDate) -> AppResult<DailySummary> {
        let row: (i64, i64, i64, i64, i64, Option<f64>) = sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COUNT(*) FILTER (WHERE status = 'WAITING'),
                   COUNT(*) FILTER (WHERE status = 'SERVING'),
                   COUNT(*) FILTER (WHERE status = 'COMPLETED'),
                   COUNT(*) FILTER (WHERE status = 'CANCELED'),
                   AVG(EXTRACT(EPOCH FROM (end_time - start_time)))
                       FILTER (WHERE status = 'COMPLETED')
            FROM queues
            WHERE queue_date = $1
            "#,
        )
        .bind(date)
        .fetch_one(&self.repository.pool)
        .await?;

        Ok(DailySummary {
            date,
            total: row.0,
            waiting: row.1,
            serving: row.2,
            completed: row.3,
            canceled: row.4,
            avg_service_seconds: row.5,
        })
    }

    /// Visitor counts per service over a date range
    pub async fn service_breakdown(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ServiceBreakdown>> {
        check_range(from, to)?;

        Ok(sqlx::query_as::<_, ServiceBreakdown>(
            r#"
            SELECT s.id AS service_id, s.name AS service_name,
                   COUNT(q.id) AS total,
                   COUNT(q.id) FILTER (WHERE q.status = 'COMPLETED') AS completed
            FROM services s
            LEFT JOIN queues q
                   ON q.service_id = s.id
                  AND q.queue_date >= $1 AND q.queue_date <= $2
            GROUP BY s.id, s.name
            ORDER BY total DESC, s.name
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.repository.pool)
        .await?)
    }

    /// Visitor counts bucketed by day, week, or month. Empty buckets are
    /// omitted; the front-end fills gaps.
    pub async fn time_series(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        granularity: Granularity,
    ) -> AppResult<Vec<TimeSeriesPoint>> {
        check_range(from, to)?;

        // trunc_field is a fixed identifier, never user input
        let query = format!(
            r#"
            SELECT CAST(date_trunc('{}', queue_date::timestamp) AS date) AS bucket,
                   COUNT(*) AS total
            FROM queues
            WHERE queue_date >= $1 AND queue_date <= $2
            GROUP BY bucket
            ORDER BY bucket
            "#,
            granularity.trunc_field()
        );

        Ok(sqlx::query_as::<_, TimeSeriesPoint>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(&self.repository.pool)
            .await?)
    }
}

fn check_range(from: NaiveDate, to: NaiveDate) -> AppResult<()> {
    if from > to {
        return Err(AppError::BadRequest(
            "'from' date must not be after 'to' date".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_range_is_rejected() {
        let from = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(check_range(from, to).is_err());
        assert!(check_range(to, from).is_ok());
        assert!(check_range(from, from).is_ok());
    }
}
