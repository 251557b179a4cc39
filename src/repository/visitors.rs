//! Visitors and guests repository

use sqlx::PgExecutor;

use crate::{
    error::AppResult,
    models::queue::{GuestSubmission, VisitorSubmission},
};

/// Contact rows are only ever written inside the submission transaction, so
/// every method takes an executor and the repository itself holds no pool.
#[derive(Clone)]
pub struct VisitorsRepository;

impl Default for VisitorsRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl VisitorsRepository {
    pub fn new() -> Self {
        Self
    }

    /// Insert a visitor contact row (self-service path). Runs inside the
    /// submission transaction, hence the executor parameter.
    pub async fn create_visitor<'e, E>(
        &self,
        exec: E,
        submission: &VisitorSubmission,
    ) -> AppResult<i32>
    where
        E: PgExecutor<'e>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO visitors (name, phone, email, institution, gender, education, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.phone)
        .bind(&submission.email)
        .bind(&submission.institution)
        .bind(&submission.gender)
        .bind(&submission.education)
        .bind(&submission.notes)
        .fetch_one(exec)
        .await?;

        Ok(id)
    }

    /// Insert a guest contact row (staff guest book path)
    pub async fn create_guest<'e, E>(&self, exec: E, submission: &GuestSubmission) -> AppResult<i32>
    where
        E: PgExecutor<'e>,
    {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO guests (name, phone, email, institution, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&submission.name)
        .bind(&submission.phone)
        .bind(&submission.email)
        .bind(&submission.institution)
        .bind(&submission.notes)
        .fetch_one(exec)
        .await?;

        Ok(id)
    }
}
