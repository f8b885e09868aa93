use tracing::{error, info};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
#[cfg(windows)]
use tokio::signal::windows::{ctrl_break, ctrl_c};

/// Resolves once the process is asked to stop; in-flight requests are drained after this
pub async fn shutdown_signal() {
    wait_for_signal().await;
    info!("Shutting down HTTP server");
}

/// Platform-specific signal handling implementation
#[cfg(unix)]
async fn wait_for_signal() {
    // SIGTERM (container stop) and SIGINT (Ctrl+C)
    let handlers = signal(SignalKind::terminate())
        .and_then(|sigterm| signal(SignalKind::interrupt()).map(|sigint| (sigterm, sigint)));

    let (mut sigterm, mut sigint) = match handlers {
        Ok(handlers) => handlers,
        Err(e) => {
            error!("Failed to install signal handlers: {}", e);
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM signal, initiating graceful shutdown");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT signal, initiating graceful shutdown");
        }
    }
}

/// Platform-specific signal handling implementation
#[cfg(windows)]
async fn wait_for_signal() {
    let handlers = ctrl_c().and_then(|c| ctrl_break().map(|b| (c, b)));

    let (mut ctrlc, mut ctrlbreak) = match handlers {
        Ok(handlers) => handlers,
        Err(e) => {
            error!("Failed to install signal handlers: {}", e);
            std::future::pending::<()>().await;
            return;
        }
    };

    tokio::select! {
        _ = ctrlc.recv() => {
            info!("Received Ctrl+C signal, initiating graceful shutdown");
        }
        _ = ctrlbreak.recv() => {
            info!("Received Ctrl+Break signal, initiating graceful shutdown");
        }
    }
}
