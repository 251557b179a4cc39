//! Service catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::service::{CreateService, Service, ServiceStatus, UpdateService},
};

use super::AuthenticatedUser;

#[derive(Deserialize, IntoParams)]
pub struct ServiceFilter {
    pub status: Option<ServiceStatus>,
}

/// List services; the public submission form uses status=ACTIVE
#[utoipa::path(
    get,
    path = "/services",
    tag = "services",
    params(ServiceFilter),
    responses(
        (status = 200, description = "Services", body = Vec<Service>)
    )
)]
pub async fn list_services(
    State(state): State<crate::AppState>,
    Query(filter): Query<ServiceFilter>,
) -> AppResult<Json<Vec<Service>>> {
    let services = state.services.catalog.list(filter.status).await?;
    Ok(Json(services))
}

/// Single service by id
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "services",
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service", body = Service),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Service>> {
    let service = state.services.catalog.get(id).await?;
    Ok(Json(service))
}

/// Create a service (superadmin only)
#[utoipa::path(
    post,
    path = "/services",
    tag = "services",
    security(("bearer_auth" = [])),
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created", body = Service),
        (status = 403, description = "Superadmin required")
    )
)]
pub async fn create_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateService>,
) -> AppResult<(StatusCode, Json<Service>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = state.services.catalog.create(&claims, request).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// Update a service (superadmin only)
#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "services",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Service ID")),
    request_body = UpdateService,
    responses(
        (status = 200, description = "Service updated", body = Service),
        (status = 403, description = "Superadmin required"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn update_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateService>,
) -> AppResult<Json<Service>> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = state.services.catalog.update(&claims, id, request).await?;
    Ok(Json(service))
}

/// Delete a service (superadmin only); refused while queue history references it
#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "services",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 403, description = "Superadmin required"),
        (status = 404, description = "Service not found"),
        (status = 409, description = "Service still referenced by queues")
    )
)]
pub async fn delete_service(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
