//! Telemetry Ingest Server - Binary Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use telemetry_ingest::api::{create_router, AppState};
use telemetry_ingest::{LogController, ServerConfig, ServerResult};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> ServerResult<()> {
    let config = ServerConfig::from_env()?;
    init_logging(&config.log_level)?;

    let controller = Arc::new(LogController::new(config.ingest.clone()));
    controller.init().await?;
    controller.start()?;

    let app = create_router(Arc::new(AppState::new(controller.clone())));
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        directory = %config.ingest.log_dir.display(),
        max_buffer_size = config.ingest.max_buffer_size,
        flush_interval_ms = config.ingest.flush_interval.as_millis() as u64,
        "{} {} listening",
        telemetry_ingest::NAME,
        telemetry_ingest::VERSION
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // Write out whatever is still buffered before exiting
    if let Err(e) = controller.stop().await {
        error!(error = %e, remaining = controller.buffer_size(), "final flush failed");
    }

    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str) -> ServerResult<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| format!("invalid log level: {}", e))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
