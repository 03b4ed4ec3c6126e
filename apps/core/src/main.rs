// NeuroGen Backend Entry Point
// "The Brain" - signal analysis, routing and prompt composition in front of the completion API

mod actors;
mod api;
mod brain;
mod config;
mod error;
mod logging;
mod sessions;

#[cfg(test)]
mod tests;

use actors::supervisor::SupervisorHandle;
use anyhow::Context;
use config::AppConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal in production.
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    logging::init_tracing(config.log_format)?;

    if !dotenv_loaded {
        info!("No .env file found, using the process environment");
    }
    if config.completion.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; every reply will be the fallback");
    }
    if config.fixtures.api_key.is_none() {
        warn!("FOOTBALL_API_KEY is not set; football prompts will carry no fixtures");
    }

    let supervisor = SupervisorHandle::new(&config);
    let app = api::router(api::AppState::new(supervisor.clone()));

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("NeuroGen listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Err(e) = supervisor.shutdown().await {
        warn!("Supervisor already stopped: {}", e);
    }
    info!("NeuroGen stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
