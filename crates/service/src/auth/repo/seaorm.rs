use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use tracing::warn;
use uuid::Uuid;

use models::{user, user_credentials};

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_user(u: user::Model) -> AuthUser {
    AuthUser { id: u.id, email: u.email, name: u.name }
}

fn to_credentials(c: user_credentials::Model) -> Credentials {
    Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        Ok(user::find_by_email(&self.db, email).await?.map(to_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?.map(to_user))
    }

    async fn register_user(
        &self,
        email: &str,
        name: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await?;
        let result = async {
            let created = user::create(&txn, email, name).await?;
            user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm).await?;
            Ok::<_, AuthError>(created)
        }
        .await;
        match result {
            Ok(created) => {
                txn.commit().await?;
                Ok(to_user(created))
            }
            Err(e) => {
                if let Err(rb) = txn.rollback().await {
                    warn!(error = %rb, "register rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        Ok(user_credentials::find_by_user(&self.db, user_id).await?.map(to_credentials))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm).await?;
        Ok(to_credentials(c))
    }
}
