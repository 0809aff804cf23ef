use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use cinevision::logging::init_logging;
use cinevision_server::cli::Args;
use cinevision_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Config decides the log format, so it is loaded first and its source
    // reported once logging is up.
    let loaded = args.resolve_config()?;
    let config = loaded.config;
    init_logging(config.log_format)?;
    match &loaded.source {
        Some(path) => info!(path = %path.display(), "Loaded config"),
        None => info!("No config file found, using defaults"),
    }

    let addr: SocketAddr = config
        .bind
        .parse()
        .map_err(|e| format!("Invalid bind address '{}': {}", config.bind, e))?;

    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        scratch_root = %config.scratch_root.display(),
        workers = config.workers.len(),
        "cinevision server listening"
    );

    serve(listener, AppState::from_config(&config), shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        // Without a signal handler, run until killed.
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
