//! Services repository

use sqlx::{PgExecutor, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Service, ServiceStatus, UpdateService},
};

#[derive(Clone)]
pub struct ServicesRepository {
    pool: Pool<Postgres>,
}

impl ServicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get service by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Service> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service with id {} not found", id)))
    }

    /// List services, optionally filtered by status
    pub async fn list(&self, status: Option<ServiceStatus>) -> AppResult<Vec<Service>> {
        let services = match status {
            Some(s) => {
                sqlx::query_as::<_, Service>(
                    "SELECT * FROM services WHERE status = $1 ORDER BY created_at",
                )
                .bind(s)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY created_at")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(services)
    }

    /// Find an ACTIVE service by exact name. Executor parameter so the
    /// submission transaction can resolve inside its own snapshot.
    pub async fn get_active_by_name<'e, E>(&self, exec: E, name: &str) -> AppResult<Option<Service>>
    where
        E: PgExecutor<'e>,
    {
        Ok(sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE status = 'ACTIVE' AND name = $1",
        )
        .bind(name)
        .fetch_optional(exec)
        .await?)
    }

    /// Earliest-created ACTIVE service, the fallback for unresolved purposes
    pub async fn get_earliest_active<'e, E>(&self, exec: E) -> AppResult<Option<Service>>
    where
        E: PgExecutor<'e>,
    {
        Ok(sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE status = 'ACTIVE' ORDER BY created_at LIMIT 1",
        )
        .fetch_optional(exec)
        .await?)
    }

    /// ACTIVE service by id, for explicit selection
    pub async fn get_active_by_id<'e, E>(&self, exec: E, id: i32) -> AppResult<Option<Service>>
    where
        E: PgExecutor<'e>,
    {
        Ok(sqlx::query_as::<_, Service>(
            "SELECT * FROM services WHERE status = 'ACTIVE' AND id = $1",
        )
        .bind(id)
        .fetch_optional(exec)
        .await?)
    }

    /// Create a new service (starts ACTIVE)
    pub async fn create(&self, service: &CreateService) -> AppResult<Service> {
        Ok(sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, description, status)
            VALUES ($1, $2, 'ACTIVE')
            RETURNING *
            "#,
        )
        .bind(&service.name)
        .bind(&service.description)
        .fetch_one(&self.pool)
        .await?)
    }

    /// Update name/description/status
    pub async fn update(&self, id: i32, update: &UpdateService) -> AppResult<Service> {
        let existing = self.get_by_id(id).await?;

        Ok(sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $2, description = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(update.name.as_ref().unwrap_or(&existing.name))
        .bind(update.description.as_ref().or(existing.description.as_ref()))
        .bind(update.status.unwrap_or(existing.status))
        .fetch_one(&self.pool)
        .await?)
    }

    /// Delete a service. The caller must have verified no queue references it.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Service with id {} not found", id)));
        }
        Ok(())
    }
}
