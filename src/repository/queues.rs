//! Queues repository for database operations

use chrono::NaiveDate;
use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::queue::{Queue, QueueDetails, QueueStatus, QueueType},
};

/// True when the error is the composite uniqueness constraint on
/// (queue_date, queue_number) firing; the caller should retry the whole
/// submission transaction.
pub fn is_number_collision(err: &AppError) -> bool {
    match err {
        AppError::Database(sqlx::Error::Database(db)) => {
            db.code().as_deref() == Some("23505")
                && db
                    .constraint()
                    .map(|c| c.contains("queue_date_queue_number"))
                    .unwrap_or(false)
        }
        _ => false,
    }
}

#[derive(Clone)]
pub struct QueuesRepository {
    pool: Pool<Postgres>,
}

impl QueuesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Allocate the next queue number for a day via the per-day counter row.
    /// The UPSERT increments atomically, so concurrent callers each get a
    /// distinct number without retrying in the common case.
    pub async fn allocate_number<'e, E>(&self, exec: E, date: NaiveDate) -> AppResult<i32>
    where
        E: PgExecutor<'e>,
    {
        let number: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO queue_counters (counter_date, last_number)
            VALUES ($1, 1)
            ON CONFLICT (counter_date)
            DO UPDATE SET last_number = queue_counters.last_number + 1
            RETURNING last_number
            "#,
        )
        .bind(date)
        .fetch_one(exec)
        .await?;

        Ok(number)
    }

    /// Insert a queue row with status WAITING. A uniqueness violation on
    /// (queue_date, queue_number) bubbles up for the caller's retry loop.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e, E>(
        &self,
        exec: E,
        queue_number: i32,
        queue_date: NaiveDate,
        queue_type: QueueType,
        service_id: i32,
        visitor_id: Option<i32>,
        guest_id: Option<i32>,
        tracking_link: &str,
        temp_uuid: Option<uuid::Uuid>,
    ) -> AppResult<Queue>
    where
        E: PgExecutor<'e>,
    {
        let queue = sqlx::query_as::<_, Queue>(
            r#"
            INSERT INTO queues (
                queue_number, queue_date, status, queue_type, service_id,
                visitor_id, guest_id, tracking_link, temp_uuid, filled_skd
            )
            VALUES ($1, $2, 'WAITING', $3, $4, $5, $6, $7, $8, false)
            RETURNING *
            "#,
        )
        .bind(queue_number)
        .bind(queue_date)
        .bind(queue_type)
        .bind(service_id)
        .bind(visitor_id)
        .bind(guest_id)
        .bind(tracking_link)
        .bind(temp_uuid)
        .fetch_one(exec)
        .await?;

        Ok(queue)
    }

    /// Get queue by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Queue> {
        sqlx::query_as::<_, Queue>("SELECT * FROM queues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Queue with id {} not found", id)))
    }

    /// Get queue details by its public tracking code
    pub async fn get_by_tracking_link(&self, code: &str) -> AppResult<QueueDetails> {
        sqlx::query_as::<_, QueueDetails>(&format!(
            "{} WHERE q.tracking_link = $1",
            Self::DETAILS_SELECT
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Queue not found for this tracking code".to_string()))
    }

    const DETAILS_SELECT: &'static str = r#"
        SELECT q.id, q.queue_number, q.queue_date, q.status, q.queue_type,
               s.name AS service_name,
               COALESCE(v.name, g.name) AS visitor_name,
               COALESCE(v.phone, g.phone) AS visitor_phone,
               COALESCE(v.institution, g.institution) AS visitor_institution,
               u.name AS admin_name,
               q.tracking_link, q.filled_skd, q.start_time, q.end_time, q.created_at
        FROM queues q
        JOIN services s ON q.service_id = s.id
        LEFT JOIN visitors v ON q.visitor_id = v.id
        LEFT JOIN guests g ON q.guest_id = g.id
        LEFT JOIN users u ON q.admin_id = u.id
    "#;

    /// List queues for a day with optional status/service filters
    pub async fn list(
        &self,
        date: NaiveDate,
        status: Option<QueueStatus>,
        service_id: Option<i32>,
    ) -> AppResult<Vec<QueueDetails>> {
        let mut conditions = vec!["q.queue_date = $1".to_string()];
        if status.is_some() {
            conditions.push("q.status = $2".to_string());
        }
        if service_id.is_some() {
            conditions.push(format!("q.service_id = ${}", conditions.len() + 1));
        }

        let query = format!(
            "{} WHERE {} ORDER BY q.queue_number",
            Self::DETAILS_SELECT,
            conditions.join(" AND ")
        );

        let mut q = sqlx::query_as::<_, QueueDetails>(&query).bind(date);
        if let Some(s) = status {
            q = q.bind(s);
        }
        if let Some(id) = service_id {
            q = q.bind(id);
        }

        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Queues in a date range, oldest first, for exports
    pub async fn list_range(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<QueueDetails>> {
        Ok(sqlx::query_as::<_, QueueDetails>(&format!(
            "{} WHERE q.queue_date >= $1 AND q.queue_date <= $2 ORDER BY q.queue_date, q.queue_number",
            Self::DETAILS_SELECT
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Conditionally move a WAITING queue to SERVING. Returns None when the
    /// row exists but is no longer WAITING (lost a race or invalid attempt).
    pub async fn mark_serving(&self, id: i32, admin_id: i32) -> AppResult<Option<Queue>> {
        Ok(sqlx::query_as::<_, Queue>(
            r#"
            UPDATE queues
            SET status = 'SERVING', start_time = NOW(), admin_id = $2
            WHERE id = $1 AND status = 'WAITING'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Conditionally move a SERVING queue to COMPLETED
    pub async fn mark_completed(&self, id: i32) -> AppResult<Option<Queue>> {
        Ok(sqlx::query_as::<_, Queue>(
            r#"
            UPDATE queues
            SET status = 'COMPLETED', end_time = NOW()
            WHERE id = $1 AND status = 'SERVING'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Conditionally move a queue to CANCELED. The caller binds the status it
    /// observed when evaluating guards, so a queue that raced from WAITING
    /// into SERVING cannot be canceled past the ownership check.
    pub async fn mark_canceled(&self, id: i32, from: QueueStatus) -> AppResult<Option<Queue>> {
        Ok(sqlx::query_as::<_, Queue>(
            r#"
            UPDATE queues
            SET status = 'CANCELED', end_time = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Record that the visitor filled the SKD satisfaction survey
    pub async fn set_filled_skd(&self, tracking_link: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE queues SET filled_skd = true WHERE tracking_link = $1")
            .bind(tracking_link)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(
                "Queue not found for this tracking code".to_string(),
            ));
        }
        Ok(())
    }

    /// Count queues referencing a service (guards service deletion)
    pub async fn count_by_service(&self, service_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queues WHERE service_id = $1")
            .bind(service_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
