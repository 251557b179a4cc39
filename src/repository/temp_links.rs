//! One-time visitor link repository

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::temp_link::TempVisitorLink,
};

#[derive(Clone)]
pub struct TempLinksRepository {
    pool: Pool<Postgres>,
}

impl TempLinksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Issue a fresh one-time link
    pub async fn create(&self, uuid: Uuid, expires_at: DateTime<Utc>) -> AppResult<TempVisitorLink> {
        Ok(sqlx::query_as::<_, TempVisitorLink>(
            r#"
            INSERT INTO temp_visitor_links (uuid, used, expires_at)
            VALUES ($1, false, $2)
            RETURNING *
            "#,
        )
        .bind(uuid)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Get a link by uuid
    pub async fn get(&self, uuid: Uuid) -> AppResult<TempVisitorLink> {
        sqlx::query_as::<_, TempVisitorLink>("SELECT * FROM temp_visitor_links WHERE uuid = $1")
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Unknown form link".to_string()))
    }

    /// Consume a link exactly once. The conditional UPDATE is the idempotency
    /// guard: a second submission through the same uuid updates zero rows.
    pub async fn consume<'e, E>(&self, exec: E, uuid: Uuid) -> AppResult<bool>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE temp_visitor_links SET used = true WHERE uuid = $1 AND used = false",
        )
        .bind(uuid)
        .execute(exec)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Drop links that expired without being used; housekeeping
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM temp_visitor_links WHERE used = false AND expires_at < NOW()",
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
