//! Service offering catalog

use crate::{
    error::{AppError, AppResult},
    models::{
        service::{CreateService, Service, ServiceStatus, UpdateService},
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, status: Option<ServiceStatus>) -> AppResult<Vec<Service>> {
        self.repository.services.list(status).await
    }

    pub async fn get(&self, id: i32) -> AppResult<Service> {
        self.repository.services.get_by_id(id).await
    }

    pub async fn create(&self, claims: &UserClaims, service: CreateService) -> AppResult<Service> {
        claims.require_superadmin()?;
        let created = self.repository.services.create(&service).await?;
        tracing::info!(service = %created.name, "Service created");
        Ok(created)
    }

    pub async fn update(
        &self,
        claims: &UserClaims,
        id: i32,
        update: UpdateService,
    ) -> AppResult<Service> {
        claims.require_superadmin()?;
        self.repository.services.update(id, &update).await
    }

    /// Delete a service. Refused while queue history still references it;
    /// deactivating is the non-destructive alternative.
    pub async fn delete(&self, claims: &UserClaims, id: i32) -> AppResult<()> {
        claims.require_superadmin()?;

        let references = self.repository.queues.count_by_service(id).await?;
        if references > 0 {
            return Err(AppError::ServiceInUse(format!(
                "Service {} is referenced by {} queue entries, deactivate it instead",
                id, references
            )));
        }

        self.repository.services.delete(id).await?;
        tracing::info!(service_id = id, "Service deleted");
        Ok(())
    }
}
