//! OS signal handling.
//!
//! Ctrl-C, SIGTERM (unix) and the internal trigger all resolve the same
//! shutdown future.

use tokio::sync::broadcast::{self, error::RecvError};

/// Completes on the first of Ctrl-C, SIGTERM or a `Shutdown::trigger`.
pub async fn shutdown_signal(mut trigger: broadcast::Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    // A dropped coordinator means nobody can trigger; keep serving.
    let triggered = async {
        if let Err(RecvError::Closed) = trigger.recv().await {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => tracing::info!(signal = "SIGINT", "Shutdown signal received"),
        _ = terminate => tracing::info!(signal = "SIGTERM", "Shutdown signal received"),
        _ = triggered => tracing::info!("Shutdown triggered"),
    }
}
