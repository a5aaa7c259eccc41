//! Request/response shapes for the generated OpenAPI document. They mirror
//! the service-layer types, which stay free of documentation derives.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct ErrorDoc {
    #[schema(example = "Validation Error")]
    pub error: String,
    pub message: Option<String>,
}

#[derive(ToSchema)]
pub struct RegisterRequest { pub email: String, pub name: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct UserDoc { pub id: Uuid, pub email: String, pub name: String }

#[derive(ToSchema)]
pub struct LoginDoc {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub token: String,
    /// Unix seconds.
    pub expires_at: i64,
}

#[derive(ToSchema)]
pub struct DepartmentDoc {
    pub name: String,
    pub description: Option<String>,
    /// Appended after the last department when omitted.
    pub production_order: Option<i32>,
}

#[derive(ToSchema)]
pub struct DepartmentPatchDoc {
    pub name: Option<String>,
    /// `null` clears it.
    pub description: Option<String>,
    pub production_order: Option<i32>,
}

#[derive(ToSchema)]
pub struct ReorderDoc { pub ids: Vec<Uuid> }

#[derive(ToSchema)]
pub struct EmployeeDoc {
    pub name: String,
    pub email: Option<String>,
    pub role: Option<String>,
    #[schema(example = "08:00:00")]
    pub shift_start: Option<String>,
    #[schema(example = "17:00:00")]
    pub shift_end: Option<String>,
    pub active: Option<bool>,
    pub department_ids: Option<Vec<Uuid>>,
}

#[derive(ToSchema)]
pub struct EmployeePatchDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub shift_start: Option<String>,
    pub shift_end: Option<String>,
    pub active: Option<bool>,
    /// Replaces the whole set when present.
    pub department_ids: Option<Vec<Uuid>>,
}

#[derive(ToSchema)]
pub struct AssignmentDoc {
    pub department_id: Uuid,
    #[schema(example = "2024-06-03T08:00:00-03:00")]
    pub start_at: String,
    #[schema(example = "2024-06-03T17:00:00-03:00")]
    pub end_at: String,
    pub collaborator_ids: Vec<Uuid>,
}

#[derive(ToSchema)]
pub struct ServiceOrderDoc {
    #[schema(example = "OS-2024/001")]
    pub code: String,
    pub title: String,
    pub client: Option<String>,
    pub description: Option<String>,
    /// scheduled | in_progress | completed | cancelled
    pub status: Option<String>,
    #[schema(example = json!(["2024-06-03"]))]
    pub days: Vec<String>,
    pub departments: Vec<AssignmentDoc>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based, default 1
    pub page: Option<u32>,
    /// default 20, max 100
    pub per_page: Option<u32>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeFilterParams {
    pub department_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ServiceOrderFilterParams {
    pub status: Option<String>,
    pub department_id: Option<Uuid>,
    /// First service day, inclusive (YYYY-MM-DD)
    pub from: Option<String>,
    /// Last service day, inclusive (YYYY-MM-DD)
    pub to: Option<String>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::departments::list,
        crate::routes::departments::create,
        crate::routes::departments::get,
        crate::routes::departments::update,
        crate::routes::departments::delete,
        crate::routes::departments::reorder,
        crate::routes::departments::employees,
        crate::routes::employees::list,
        crate::routes::employees::create,
        crate::routes::employees::get,
        crate::routes::employees::update,
        crate::routes::employees::delete,
        crate::routes::service_orders::list,
        crate::routes::service_orders::create,
        crate::routes::service_orders::get,
        crate::routes::service_orders::update,
        crate::routes::service_orders::delete,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorDoc,
            RegisterRequest,
            LoginRequest,
            UserDoc,
            LoginDoc,
            DepartmentDoc,
            DepartmentPatchDoc,
            ReorderDoc,
            EmployeeDoc,
            EmployeePatchDoc,
            AssignmentDoc,
            ServiceOrderDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "departments"),
        (name = "employees"),
        (name = "service-orders")
    )
)]
pub struct ApiDoc;
