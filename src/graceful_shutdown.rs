//! Graceful shutdown

use tokio::signal;

/// Handler for graceful shutdown
///
/// Resolves once Ctrl+C or SIGTERM comes in, letting in-flight requests
/// finish before the server goes down
pub async fn handler() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Valid CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Valid terminate handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Terminate signal received, starting graceful shutdown");
}
