//! Main entry point for the latchd lock coordination server.
//!
//! Starts the RESP transport and the HTTP transport over one shared lock
//! engine and runs until a shutdown signal arrives.

use std::sync::Arc;

use latchd_core::{LockRegistry, LockService};
use latchd_server::{Configuration, resp::RespServer, startup};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let configuration = Configuration::from_env();
    let _logging_guard = startup::init_logging(&configuration.logging);

    let registry = Arc::new(LockRegistry::new());
    let service = LockService::new(registry);

    RespServer::new(configuration.resp.clone(), service.clone())
        .start()
        .await?;

    info!(
        "Starting HTTP server on {}:{}",
        configuration.http.bind_address, configuration.http.port
    );
    let http = startup::http_server(service, &configuration.http)?;

    let shutdown = startup::wait_for_shutdown_signal().await;
    let mut shutdown_rx = shutdown.subscribe();

    tokio::select! {
        result = http => {
            if let Err(e) = result {
                error!("HTTP server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutting down gracefully");
        }
    }

    info!("latchd server shutdown complete");
    Ok(())
}
