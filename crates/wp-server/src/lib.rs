//! wp-server: HTTP API for WebP conversion.
//!
//! This crate ties the wp-* crates into a running server:
//!
//! - Axum router with `/health`, `/convert` and the optional `/debug`
//! - request-id and tracing middleware
//! - graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;

use std::net::SocketAddr;

use wp_core::config::Config;

use crate::context::AppContext;

/// Start the conversion server.
///
/// Logs configuration warnings and the encoder location, then serves until
/// SIGINT or SIGTERM.
pub async fn start(config: Config) -> wp_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let ctx = AppContext::new(config.clone());

    match ctx.locator.resolve() {
        Ok(location) => tracing::info!(
            "Using encoder at {} ({:?})",
            location.path.display(),
            location.origin
        ),
        Err(e) => tracing::warn!("Encoder not available; conversions will fail: {e}"),
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| wp_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let app = router::build_router(ctx);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| wp_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Starting server on {}", listener.local_addr().unwrap_or(addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| wp_core::Error::Internal(format!("Server error: {e}")))?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
