//! Cancellation on SIGINT / SIGTERM
//!
//! A single `watch` channel flips to `true` when a signal arrives. Commands race
//! their remote calls against it and still close the session afterwards.

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Token plus the sender that cancels it
    pub fn new() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    /// Token that never fires
    pub fn never() -> Self {
        Self::new().1
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever if the sender is gone
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Spawn a task that cancels the returned token on Ctrl+C or SIGTERM
pub fn listen_for_shutdown() -> CancelToken {
    let (tx, token) = CancelToken::new();

    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, cancelling");
        let _ = tx.send(true);
    });

    token
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_token_fires_after_send() {
        let (tx, mut token) = CancelToken::new();
        assert!(!token.is_cancelled());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_never_token_does_not_fire() {
        let mut token = CancelToken::never();
        let fired = tokio::time::timeout(Duration::from_millis(50), token.cancelled()).await;
        assert!(fired.is_err());
    }
}
