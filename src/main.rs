//! Taskboard HTTP server.

use anyhow::Context;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use std::net::SocketAddr;
use std::sync::Arc;
use taskboard::{
    api,
    config::Config,
    observability::init_logging,
    task::{
        adapters::{credentials::BcryptVerifier, logging::TracingNotifier, postgres::PostgresTaskStore},
        services::TaskLifecycleService,
    },
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_logging(config.log_format);

    let manager = ConnectionManager::<PgConnection>::new(config.require_database_url()?);
    let pool = Pool::builder()
        .max_size(config.db_pool_size)
        .build(manager)
        .context("failed to open the database pool")?;

    let service = TaskLifecycleService::new(
        Arc::new(PostgresTaskStore::new(pool)),
        Arc::new(DefaultClock),
        Arc::new(BcryptVerifier),
        Arc::new(TracingNotifier),
        config.notification.clone(),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(%addr, pool_size = config.db_pool_size, "taskboard listening");

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}
