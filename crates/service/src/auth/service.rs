use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{RegisterInput, LoginInput, AuthUser, AuthSession};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token::{self, Claims};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>, token_ttl_hours: i64) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_hours, password_algorithm: "argon2".into() }
    }
}

/// Registration, login and token checks, independent of the web framework.
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    cfg: AuthConfig,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("secret", 12));
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password too short (>={MIN_PASSWORD_LEN})")));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!(user_id = %existing.id, "email already registered");
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let user = self.repo
            .register_user(&input.email, &input.name, hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(event = "user_registered", user_id = %user.id, email = %user.email);
        Ok(user)
    }

    /// Check the password and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{AuthService, AuthConfig, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("secret", 12));
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::Unauthorized);
        }

        let (token, claims) = token::issue_token(&user, &self.cfg.jwt_secret, self.cfg.token_ttl_hours)?;
        info!(event = "user_logged_in", user_id = %user.id);
        Ok(AuthSession { user, token, expires_at: claims.exp })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        token::verify_token(token, &self.cfg.jwt_secret)
    }

    /// The account behind verified claims.
    pub async fn me(&self, user_id: Uuid) -> Result<AuthUser, AuthError> {
        self.repo.find_user_by_id(user_id).await?.ok_or(AuthError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService {
        AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("unit-secret", 2))
    }

    fn reg(email: &str, password: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Operator".into(), password: password.into() }
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let err = svc().register(reg("a@b.io", "short")).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.code(), 1001);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_case_insensitively() {
        let s = svc();
        s.register(reg("dup@b.io", "Password1")).await.unwrap();
        let err = s.register(reg("DUP@b.io", "Password1")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn login_issues_token_for_me() {
        let s = svc();
        let user = s.register(reg("me@b.io", "Password1")).await.unwrap();
        let session = s.login(LoginInput { email: "me@b.io".into(), password: "Password1".into() }).await.unwrap();
        let claims = s.verify(&session.token).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(session.expires_at, claims.exp);
        assert_eq!(s.me(claims.uid).await.unwrap(), user);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let s = svc();
        s.register(reg("x@b.io", "Password1")).await.unwrap();
        let wrong = s.login(LoginInput { email: "x@b.io".into(), password: "Password2".into() }).await.unwrap_err();
        let unknown = s.login(LoginInput { email: "y@b.io".into(), password: "Password1".into() }).await.unwrap_err();
        assert_eq!(wrong.code(), unknown.code());
        assert!(matches!(wrong, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn me_for_deleted_account_is_not_found() {
        assert!(matches!(svc().me(Uuid::new_v4()).await, Err(AuthError::NotFound)));
    }
}
