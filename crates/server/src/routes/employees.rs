use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use models::employee;
use service::db::employee_service::{self, EmployeeDetail, EmployeeFilter, EmployeeInput, EmployeePatch};

use crate::{errors::JsonApiError, routes::auth::ServerState};

#[utoipa::path(
    get, path = "/employees", tag = "employees",
    params(crate::openapi::PageParams, crate::openapi::EmployeeFilterParams),
    responses((status = 200, description = "Employees by name")),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, JsonApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<EmployeeFilter>, JsonApiError>,
) -> Result<Json<Page<employee::Model>>, JsonApiError> {
    Ok(Json(employee_service::list_employees(&state.db, filter, page).await?))
}

#[utoipa::path(
    post, path = "/employees", tag = "employees",
    request_body = crate::openapi::EmployeeDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown department", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<EmployeeInput>, JsonApiError>,
) -> Result<(StatusCode, Json<EmployeeDetail>), JsonApiError> {
    let created = employee_service::create_employee(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/employees/{id}", tag = "employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses((status = 200, description = "Employee with department ids"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)),
    security(("bearer" = []))
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<Json<EmployeeDetail>, JsonApiError> {
    Ok(Json(employee_service::get_employee(&state.db, id).await?))
}

#[utoipa::path(
    put, path = "/employees/{id}", tag = "employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = crate::openapi::EmployeePatchDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
    WithRejection(Json(patch), _): WithRejection<Json<EmployeePatch>, JsonApiError>,
) -> Result<Json<EmployeeDetail>, JsonApiError> {
    Ok(Json(employee_service::update_employee(&state.db, id, patch).await?))
}

#[utoipa::path(
    delete, path = "/employees/{id}", tag = "employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Assigned to a service order", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    employee_service::delete_employee(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
