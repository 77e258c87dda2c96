// Graceful shutdown module
// Waits for in-flight responses after the listener has been closed

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppState;
use crate::logger;

/// How often the drain loop re-checks the counter if no close notification arrives
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Wait until every active connection has finished or `grace` has elapsed.
///
/// Connections were already told to shut down gracefully, so keep-alive
/// connections close after their current response. Streams still running when the
/// grace period ends are abandoned with the runtime.
///
/// Returns the number of connections still open when the wait ended.
pub async fn drain_connections(state: Arc<AppState>, grace: Duration) -> usize {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = state.active_connection_count();
        if remaining == 0 {
            logger::log_info("All connections closed");
            return 0;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Grace period of {}s elapsed with {remaining} connection(s) still open",
                grace.as_secs()
            ));
            return remaining;
        }

        logger::log_debug(&format!("Waiting for {remaining} connection(s) to finish"));
        tokio::select! {
            () = state.connection_closed.notified() => {}
            () = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
            () = tokio::time::sleep_until(deadline) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::atomic::Ordering;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(&Config::defaults().unwrap()))
    }

    #[tokio::test]
    async fn test_returns_immediately_when_idle() {
        let remaining = drain_connections(state(), Duration::from_secs(5)).await;
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_waits_for_connections() {
        let state = state();
        state.active_connections.store(1, Ordering::SeqCst);

        let closer = Arc::clone(&state);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            closer.active_connections.fetch_sub(1, Ordering::SeqCst);
            closer.connection_closed.notify_waiters();
        });

        let remaining = drain_connections(state, Duration::from_secs(5)).await;
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_gives_up_after_grace_period() {
        let state = state();
        state.active_connections.store(2, Ordering::SeqCst);
        let remaining = drain_connections(state, Duration::from_millis(30)).await;
        assert_eq!(remaining, 2);
    }
}
