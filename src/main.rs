mod app_system;
mod clients;
mod domain;
mod http;
mod schema;
mod store;


use anyhow::Context;
use tracing::{error, info};

use crate::app_system::{setup_tracing, Config, StoreSystem};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    setup_tracing(config.log_format);

    info!(addr = %config.addr, "Starting storefront");

    let system = StoreSystem::new();
    let app = http::router(&system);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated abnormally")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
