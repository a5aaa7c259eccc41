use std::{future::Future, net::SocketAddr};

use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &configs::ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.host, cfg.port).parse()?)
}

/// Serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    run_until(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Load config, connect, migrate and serve until `shutdown` resolves.
/// In-flight requests finish before this returns.
pub async fn run_until(shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = configs::AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    info!(event = "migrations_applied");

    let state = ServerState::from_db(db, &cfg.auth);
    let app = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg.server)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, event = "listening", "shopfloor api ready");
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(event = "drained", "http server stopped");
    Ok(())
}
