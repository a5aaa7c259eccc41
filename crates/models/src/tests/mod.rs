use std::time::Duration;

use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::db::{connect_with_config, database_config};

/// Database connection and configuration tests
pub mod db_tests;


/// Transaction handling and referential integrity tests
pub mod transaction_tests;

// Migrations run once per test binary; `false` means the database is unreachable.
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> configs::DatabaseConfig {
    let mut cfg = database_config();
    cfg.min_connections = 1;
    cfg.max_connections = cfg.max_connections.max(5);
    cfg.connect_timeout_secs = 3;
    cfg.acquire_timeout_secs = 5;
    cfg
}

/// Fresh migrated connection, or `None` when DB tests are disabled or the
/// database cannot be reached.
pub(crate) async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let ready = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&test_config()).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            if let Err(e) = migration::Migrator::up(&db, None).await {
                eprintln!("skip: migrate up failed: {}", e);
                return false;
            }
            true
        })
        .await;
    if !ready {
        return None;
    }
    match tokio::time::timeout(Duration::from_secs(10), connect_with_config(&test_config())).await {
        Ok(Ok(db)) => Some(db),
        _ => None,
    }
}

/// Unique suffix so parallel tests never collide on unique columns.
pub(crate) fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
