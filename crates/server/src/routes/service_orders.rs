use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use common::{pagination::Pagination, types::Page};
use service::auth::Claims;
use service::service_order::domain::{ServiceOrderDetail, ServiceOrderFilter, ServiceOrderInput};

use crate::{errors::JsonApiError, routes::auth::ServerState};

#[utoipa::path(
    get, path = "/service-orders", tag = "service-orders",
    params(crate::openapi::PageParams, crate::openapi::ServiceOrderFilterParams),
    responses((status = 200, description = "Newest first"), (status = 400, description = "Bad filter", body = crate::openapi::ErrorDoc)),
    security(("bearer" = []))
)]
pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(page), _): WithRejection<Query<Pagination>, JsonApiError>,
    WithRejection(Query(filter), _): WithRejection<Query<ServiceOrderFilter>, JsonApiError>,
) -> Result<Json<Page<ServiceOrderDetail>>, JsonApiError> {
    Ok(Json(state.service_orders.list(filter, page).await?))
}

/// The departments and collaborators must exist; the order is written in one
/// transaction together with its windows, collaborators and days.
#[utoipa::path(
    post, path = "/service-orders", tag = "service-orders",
    request_body = crate::openapi::ServiceOrderDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Unknown department or collaborator", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Code already used", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(input), _): WithRejection<Json<ServiceOrderInput>, JsonApiError>,
) -> Result<(StatusCode, Json<ServiceOrderDetail>), JsonApiError> {
    let created = state.service_orders.create(input, Some(claims.uid)).await?;
    info!(id = %created.id, code = %created.code, user_id = %claims.uid, "created service order");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get, path = "/service-orders/{id}", tag = "service-orders",
    params(("id" = Uuid, Path, description = "Service order ID")),
    responses((status = 200, description = "Order with days, departments and collaborators"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)),
    security(("bearer" = []))
)]
pub async fn get(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<Json<ServiceOrderDetail>, JsonApiError> {
    Ok(Json(state.service_orders.get(id).await?))
}

#[utoipa::path(
    put, path = "/service-orders/{id}", tag = "service-orders",
    params(("id" = Uuid, Path, description = "Service order ID")),
    request_body = crate::openapi::ServiceOrderDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 404, description = "Order, department or collaborator not found", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Code already used", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn update(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
    WithRejection(Json(input), _): WithRejection<Json<ServiceOrderInput>, JsonApiError>,
) -> Result<Json<ServiceOrderDetail>, JsonApiError> {
    Ok(Json(state.service_orders.update(id, input).await?))
}

#[utoipa::path(
    delete, path = "/service-orders/{id}", tag = "service-orders",
    params(("id" = Uuid, Path, description = "Service order ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found", body = crate::openapi::ErrorDoc)),
    security(("bearer" = []))
)]
pub async fn delete(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, JsonApiError>,
) -> Result<StatusCode, JsonApiError> {
    if state.service_orders.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(JsonApiError::not_found("service order not found"))
    }
}
