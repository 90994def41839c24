//! Route optimization HTTP microservice backed by the VROOM binary.
//!
//! # Configuration
//!
//! - `VROOM_BINARY`, `VROOM_MODE`, `VROOM_USE_ROUTING_LIB`, `VROOM_THREADS`,
//!   `VROOM_TIMEOUT_SECS`, `VROOM_MAX_CONCURRENT`: optimizer settings
//! - `SERVICE_PORT`: HTTP port (default: 8080)
//! - `RUST_LOG`: log level (default: info)
//! - `LOG_FORMAT`: json (default) or text
//! - `METRICS_ENABLED`: expose `/metrics` data (default: true)

use std::net::SocketAddr;

use tracing::{error, info, warn};

use vroomapi_service_route::router;
use vroomapi_service_shared::{
    init_logging, init_metrics, AppState, LoggingConfig, MetricsConfig, ServiceConfig,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LoggingConfig::from_env().with_service("vroomapi-route"));

    if let Err(e) = init_metrics(&MetricsConfig::from_env()) {
        warn!(error = %e, "continuing without metrics");
    }

    let config = ServiceConfig::from_env();
    info!(
        binary = %config.optimizer.binary.display(),
        mode = %config.optimizer.mode,
        threads = config.optimizer.threads,
        timeout_secs = config.optimizer.timeout.map(|t| t.as_secs()),
        max_concurrent = config.optimizer.max_concurrent,
        port = config.port,
        "starting route service"
    );

    let app = router(AppState::new(config.optimizer));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!(error = %e, addr = %addr, "failed to bind");
        e
    })?;
    info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("route service stopped");
    Ok(())
}

/// Resolve on Ctrl-C. If the handler cannot be installed, never resolve.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested, draining connections"),
        Err(e) => {
            error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}
