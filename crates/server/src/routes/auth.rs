use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use service::auth::{
    domain::{AuthUser, LoginInput, RegisterInput},
    repo::SeaOrmAuthRepository,
    AuthConfig, AuthService, Claims,
};
use service::service_order::{repo::SeaOrmServiceOrderRepository, ServiceOrderService};

use crate::errors::JsonApiError;

pub const AUTH_COOKIE: &str = "auth_token";

/// Shared by every handler. The connection pool is used directly by the
/// department and employee handlers.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService>,
    pub service_orders: Arc<ServiceOrderService>,
}

impl ServerState {
    /// Wire the SeaORM repositories onto one pool.
    pub fn from_db(db: DatabaseConnection, cfg: &configs::AuthConfig) -> Self {
        let auth = AuthService::new(
            Arc::new(SeaOrmAuthRepository::new(db.clone())),
            AuthConfig::new(cfg.jwt_secret.clone(), cfg.token_ttl_hours),
        );
        let service_orders = ServiceOrderService::new(Arc::new(SeaOrmServiceOrderRepository::new(db.clone())));
        Self { db, auth: Arc::new(auth), service_orders: Arc::new(service_orders) }
    }
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub token: String,
    pub expires_at: i64,
}

#[utoipa::path(
    post, path = "/auth/register", tag = "auth",
    request_body = crate::openapi::RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = crate::openapi::UserDoc),
        (status = 400, description = "Validation Error", body = crate::openapi::ErrorDoc),
        (status = 409, description = "Conflict", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn register(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<RegisterInput>, JsonApiError>,
) -> Result<(StatusCode, Json<AuthUser>), JsonApiError> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post, path = "/auth/login", tag = "auth",
    request_body = crate::openapi::LoginRequest,
    responses(
        (status = 200, description = "Logged In; also sets the auth_token cookie", body = crate::openapi::LoginDoc),
        (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    WithRejection(Json(input), _): WithRejection<Json<LoginInput>, JsonApiError>,
) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    let user = session.user;
    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, token: session.token, expires_at: session.expires_at };
    Ok((jar.add(cookie), Json(out)))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get, path = "/auth/me", tag = "auth",
    responses(
        (status = 200, description = "Current user", body = crate::openapi::UserDoc),
        (status = 401, description = "Unauthorized", body = crate::openapi::ErrorDoc)
    ),
    security(("bearer" = []))
)]
pub async fn me(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<AuthUser>, JsonApiError> {
    Ok(Json(state.auth.me(claims.uid).await?))
}

/// Routes reachable without a token.
fn is_public(path: &str, method: &Method) -> bool {
    path == "/health"
        || path == "/auth/login"
        || path == "/auth/register"
        || path == "/auth/logout"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || method == Method::OPTIONS
}

/// `Authorization: Bearer <token>`, else the `auth_token` cookie. Other
/// `Authorization` schemes are ignored.
fn extract_token(req: &Request) -> Result<Option<String>, JsonApiError> {
    if let Some(h) = req.headers().get(header::AUTHORIZATION) {
        let value = h.to_str().map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        if let Some(token) = value.strip_prefix("Bearer ") {
            let token = token.trim();
            if token.is_empty() {
                return Err(JsonApiError::unauthorized("empty bearer token"));
            }
            return Ok(Some(token.to_string()));
        }
    }
    let jar = CookieJar::from_headers(req.headers());
    Ok(jar.get(AUTH_COOKIE).map(|c| c.value().to_string()).filter(|t| !t.is_empty()))
}

/// Verifies the token of every non-public request and stores its `Claims`
/// in the request extensions.
pub async fn require_bearer_token_state(State(state): State<ServerState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if is_public(&path, req.method()) {
        return next.run(req).await;
    }

    let token = match extract_token(&req) {
        Ok(Some(token)) => token,
        Ok(None) => {
            warn!(path = %path, "missing Authorization header and auth_token cookie");
            return JsonApiError::unauthorized("authentication required").into_response();
        }
        Err(e) => {
            warn!(path = %path, "invalid Authorization header");
            return e.into_response();
        }
    };

    match state.auth.verify(&token) {
        Ok(claims) => {
            info!(path = %path, user_id = %claims.uid, "token accepted");
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!(path = %path, code = e.code(), "token validation failed");
            JsonApiError::unauthorized("invalid or expired token").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn req(uri: &str, headers: &[(&str, &str)]) -> Request {
        let mut b = axum::http::Request::builder().uri(uri);
        for (k, v) in headers {
            b = b.header(*k, *v);
        }
        b.body(Body::empty()).unwrap()
    }

    #[test]
    fn public_paths() {
        assert!(is_public("/health", &Method::GET));
        assert!(is_public("/docs/index.html", &Method::GET));
        assert!(is_public("/service-orders", &Method::OPTIONS));
        assert!(!is_public("/auth/me", &Method::GET));
        assert!(!is_public("/departments", &Method::GET));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let r = req("/x", &[("authorization", "Bearer abc"), ("cookie", "auth_token=zzz")]);
        assert_eq!(extract_token(&r).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_the_fallback() {
        let r = req("/x", &[("cookie", "theme=dark; auth_token=zzz")]);
        assert_eq!(extract_token(&r).unwrap().as_deref(), Some("zzz"));
        assert_eq!(extract_token(&req("/x", &[])).unwrap(), None);
    }

    #[test]
    fn non_bearer_scheme_falls_back_to_cookie() {
        let r = req("/x", &[("authorization", "Basic dXNlcjpwdw=="), ("cookie", "auth_token=zzz")]);
        assert_eq!(extract_token(&r).unwrap().as_deref(), Some("zzz"));
        let r = req("/x", &[("authorization", "Basic dXNlcjpwdw==")]);
        assert_eq!(extract_token(&r).unwrap(), None);
    }

    #[test]
    fn empty_bearer_is_rejected() {
        let r = req("/x", &[("authorization", "Bearer  "), ("cookie", "auth_token=zzz")]);
        assert!(extract_token(&r).is_err());
    }
}
