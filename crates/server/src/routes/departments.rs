use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::{department, employee};
use service::db::department_service::{self, DepartmentInput, DepartmentPatch};

use crate::{errors::JsonApiError, routes::auth::ServerState};

#[derive(Debug, Deserialize)]
pub struct ReorderInput {
    pub ids: Vec<Uuid>,
}

#[utoipa::path(
    get, path = "/departments", tag = "departments",
    params(crate::openapi::PageParams),
    responses((status = 200, description = "Departments along the production line")),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, JsonApiError>,
) -> Result<Json<Page<department::Model>>, JsonApiError> {
    Ok(Json(department_service::list_departments(&state.db, page).await?))
}

#[utoipa::path(
    post, path = "/departments", tag = "departments",
    request_body = crate::openapi::DepartmentDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Name already used", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<DepartmentInput>, JsonApiError>,
) -> Result<(StatusCode, Json<department::Model>), JsonApiError> {
    let created = department_service::create_department(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/departments/{id}", tag = "departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses((status = 200, description = "OK"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)),
    security(("bearer" = []))
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<Json<department::Model>, JsonApiError> {
    Ok(Json(department_service::get_department(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/departments/{id}", tag = "departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = crate::openapi::DepartmentPatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Name already used", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<DepartmentPatch>, JsonApiError>,
) -> Result<Json<department::Model>, JsonApiError> {
    Ok(Json(department_service::update_department(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/departments/{id}", tag = "departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Still used by a service order", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    department_service::delete_department(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put, path = "/departments/order", tag = "departments",
    request_body = crate::openapi::ReorderDoc,
    responses(
        (status = 200, description = "New ranking"),
        (status = 400, description = "Duplicate ids", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown department", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn reorder(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<ReorderInput>, JsonApiError>,
) -> Result<Json<Vec<department::Model>>, JsonApiError> {
    let ordered = department_service::reorder_departments(&state.db, &input.ids).await?;
    info!(count = ordered.len(), "departments reordered");
    Ok(Json(ordered))
}

#[utoipa::path(
    get, path = "/departments/{id}/employees", tag = "departments",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses((status = 200, description = "Employees of the department"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)),
    security(("bearer" = []))
)]
pub async fn employees(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<Json<Vec<employee::Model>>, JsonApiError> {
    Ok(Json(department_service::list_department_employees(&state.db, id).await?))
}
