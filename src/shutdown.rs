use tokio_util::sync::CancellationToken;

/// Install a handler that listens for SIGTERM and SIGINT (Ctrl-C).
///
/// Returns a `CancellationToken` that is cancelled when either signal is
/// received. Long-running commands such as `job watch` select on the token and
/// stop their refresh loop when it fires.
pub fn install_interrupt_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if wait_for_signal().await {
            token_clone.cancel();
        }
    });

    token
}

/// Resolves once a stop signal arrives. Returns false if no handler could be
/// installed, in which case the token is left alone.
#[cfg(unix)]
async fn wait_for_signal() -> bool {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGTERM handler");
            return ctrl_c().await;
        }
    };
    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install SIGINT handler");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM, stopping");
            return true;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, stopping");
        }
        _ = sigint.recv() => {
            tracing::info!("Received SIGINT, stopping");
        }
    }
    true
}

#[cfg(not(unix))]
async fn wait_for_signal() -> bool {
    ctrl_c().await
}

async fn ctrl_c() -> bool {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received interrupt, stopping");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for interrupt");
            false
        }
    }
}
