//! # Host lifetime: the process-wide shutdown signal.
//!
//! [`Lifetime`] holds the "application is stopping" token. Every wait issued
//! through a notifier built with this lifetime is cancelled when the token
//! fires, whatever the caller's own token does.
//!
//! The token can be fired explicitly ([`Lifetime::stop`]) or from OS signals
//! ([`Lifetime::stop_on_os_signal`]):
//!
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Process shutdown signal shared by notifiers.
///
/// Cheap to clone; clones share the same token.
#[derive(Clone, Debug, Default)]
pub struct Lifetime {
    stopping: CancellationToken,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses an externally owned token as the shutdown signal.
    pub fn from_token(stopping: CancellationToken) -> Self {
        Self { stopping }
    }

    /// Token cancelled when the application starts stopping.
    pub fn stopping_token(&self) -> CancellationToken {
        self.stopping.clone()
    }

    /// Fires the shutdown signal.
    pub fn stop(&self) {
        self.stopping.cancel();
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.is_cancelled()
    }

    /// Spawns a task that fires the shutdown signal on the first OS termination signal.
    ///
    /// Must be called within a tokio runtime. The task exits without firing if
    /// signal handlers cannot be installed or the lifetime is stopped first.
    pub fn stop_on_os_signal(&self) -> JoinHandle<()> {
        let stopping = self.stopping.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = stopping.cancelled() => {}
                res = wait_for_shutdown_signal() => match res {
                    Ok(()) => {
                        tracing::info!("shutdown signal received");
                        stopping.cancel();
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to install shutdown signal handlers")
                    }
                },
            }
        })
    }
}

/// Waits for a termination signal.
///
/// Each call creates independent signal listeners.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_token() {
        let lifetime = Lifetime::new();
        let token = lifetime.clone().stopping_token();
        assert!(!lifetime.is_stopping());

        lifetime.stop();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn signal_watcher_exits_when_stopped() {
        let lifetime = Lifetime::from_token(CancellationToken::new());
        let watcher = lifetime.stop_on_os_signal();

        lifetime.stop();
        watcher.await.unwrap();
    }
}
