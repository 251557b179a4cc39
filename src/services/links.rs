//! QR exchange and one-time visitor links
//!
//! A static QR code is printed at the desk. Scanning it hits the exchange
//! endpoint, which mints a short-lived single-use link for the self-service
//! form. The static code itself never grants form access.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    config::QueueConfig,
    error::{AppError, AppResult},
    models::temp_link::TempVisitorLink,
    repository::Repository,
};

#[derive(Clone)]
pub struct LinksService {
    repository: Repository,
    config: QueueConfig,
}

impl LinksService {
    pub fn new(repository: Repository, config: QueueConfig) -> Self {
        Self { repository, config }
    }

    /// Exchange the printed static QR uuid for a fresh one-time link
    pub async fn exchange(&self, static_uuid: Uuid) -> AppResult<TempVisitorLink> {
        let expected: Uuid = self
            .config
            .static_qr_uuid
            .parse()
            .map_err(|_| AppError::Internal("Static QR uuid is not configured".to_string()))?;

        if static_uuid != expected {
            return Err(AppError::NotFound("Unknown QR code".to_string()));
        }

        let link = self
            .repository
            .temp_links
            .create(
                Uuid::new_v4(),
                Utc::now() + Duration::minutes(self.config.link_ttl_minutes),
            )
            .await?;

        tracing::debug!(link_uuid = %link.uuid, "Issued one-time visitor link");
        Ok(link)
    }

    /// Check that a link is still usable before showing the form. Read-only;
    /// consumption happens inside the submission transaction.
    pub async fn validate(&self, uuid: Uuid) -> AppResult<TempVisitorLink> {
        let link = self.repository.temp_links.get(uuid).await?;
        if link.used {
            return Err(AppError::LinkUsed(
                "This form link has already been used".to_string(),
            ));
        }
        if link.is_expired(Utc::now()) {
            return Err(AppError::LinkExpired(
                "This form link has expired".to_string(),
            ));
        }
        Ok(link)
    }

    /// Remove expired unused links
    pub async fn cleanup_expired(&self) -> AppResult<u64> {
        let removed = self.repository.temp_links.delete_expired().await?;
        if removed > 0 {
            tracing::info!(removed, "Cleaned up expired visitor links");
        }
        Ok(removed)
    }
}
