use anyhow::Context;
use hostinfo::config::Config;
use hostinfo::hostname::SystemHostname;
use hostinfo::server::{create_metrics, run_server, shutdown_channel, wait_for_signal, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hostinfo server");

    let config = Config::from_env().context("invalid configuration")?;
    info!(bind_addr = %config.bind_addr, "Configuration loaded");

    let metrics = create_metrics().context("failed to create metrics registry")?;
    info!("Prometheus metrics registry initialized");

    let state = AppState::new(metrics, Arc::new(SystemHostname));
    let (shutdown_controller, shutdown_signal) = shutdown_channel();

    let mut server = tokio::spawn(async move { run_server(&config, state, shutdown_signal).await });

    // Run until a termination signal arrives, or the server gives up on its own
    tokio::select! {
        result = &mut server => {
            result
                .context("server task panicked")?
                .context("server failed")?;
            info!("Server exited without a shutdown signal");
            return Ok(());
        }
        signal = wait_for_signal() => {
            let signal = signal.context("failed to install signal handlers")?;
            info!(signal = signal, "Initiating graceful shutdown");
        }
    }

    shutdown_controller.shutdown();

    server
        .await
        .context("server task panicked")?
        .context("server failed during shutdown")?;

    info!("hostinfo server shut down gracefully");
    Ok(())
}
