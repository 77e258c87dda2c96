// Application state module
// Immutable configuration plus the process-wide connection bookkeeping

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Notify};

use super::types::Config;

/// Application state
///
/// Shared read-only by every connection task. Request handlers only read
/// `config`; nothing here carries per-request data.
pub struct AppState {
    pub config: Config,
    /// Number of connections currently being served
    pub active_connections: Arc<AtomicUsize>,
    /// Flips to `true` once when the process should stop accepting connections
    pub shutdown: watch::Sender<bool>,
    /// Notified every time a connection finishes, used while draining
    pub connection_closed: Arc<Notify>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown: watch::Sender::new(false),
            connection_closed: Arc::new(Notify::new()),
        }
    }

    /// Ask the accept loop and every open connection to wind down
    pub fn request_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Resolves once shutdown has been requested, immediately if it already was
    pub fn shutdown_requested(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown.subscribe();
        async move {
            let _ = rx.wait_for(|stop| *stop).await;
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn active_connection_count(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}
