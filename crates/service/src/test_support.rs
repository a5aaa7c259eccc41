#![cfg(test)]
use std::time::Duration;

use migration::MigratorTrait;
use models::db::{connect_with_config, database_config};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Migrations run once per test binary; `false` means the database is unreachable.
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> configs::DatabaseConfig {
    let mut cfg = database_config();
    cfg.min_connections = 1;
    cfg.max_connections = cfg.max_connections.max(10);
    cfg.connect_timeout_secs = 3;
    cfg.acquire_timeout_secs = 10;
    cfg
}

/// Fresh connection for the current test's runtime, or `None` when
/// `SKIP_DB_TESTS` is set or the database cannot be reached.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let ready = *MIGRATED
        .get_or_init(|| async {
            match connect_with_config(&test_config()).await {
                Ok(db) => match migration::Migrator::up(&db, None).await {
                    Ok(()) => true,
                    Err(e) => {
                        eprintln!("skip db tests: migrate up failed: {e}");
                        false
                    }
                },
                Err(e) => {
                    eprintln!("skip db tests: cannot connect: {e}");
                    false
                }
            }
        })
        .await;
    if !ready {
        return None;
    }
    tokio::time::timeout(Duration::from_secs(10), connect_with_config(&test_config()))
        .await
        .ok()
        .and_then(Result::ok)
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}
