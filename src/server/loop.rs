// Server loop module
// Accepts connections until shutdown is requested, then drains

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::shutdown::drain_connections;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop on `listener` until [`AppState::request_shutdown`] is called.
///
/// After shutdown the listener is closed first, so new clients are refused while
/// in-flight downloads get `performance.shutdown_grace_period` seconds to finish.
pub async fn start_server_loop(
    listener: TcpListener,
    state: Arc<AppState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let shutdown = state.shutdown_requested();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            () = &mut shutdown => {
                break;
            }
        }
    }

    let addr = listener.local_addr()?;
    drop(listener);
    logger::log_info(&format!("Stopped accepting connections on {addr}"));

    let grace = Duration::from_secs(state.config.performance.shutdown_grace_period);
    drain_connections(Arc::clone(&state), grace).await;
    logger::log_info("Server stopped");
    Ok(())
}
