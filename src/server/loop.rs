// Server loop module
// Accepts connections until shutdown, then drains open connections

use hyper_util::server::graceful::GracefulShutdown;
use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::listener::create_listener;
use crate::config::AppState;
use crate::logger;

/// Pause after a failed accept so fd exhaustion does not spin the loop
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Bind the configured address, print the banner and serve until `shutdown`
/// completes.
///
/// Bind failures are returned to the caller; they are fatal for the process.
pub async fn run<F>(state: Arc<AppState>, shutdown: F) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()>,
{
    let addr = state.config.get_socket_addr()?;
    let listener = match create_listener(addr) {
        Ok(l) => l,
        Err(e) => {
            logger::log_bind_failed(&addr, &e);
            return Err(e.into());
        }
    };

    logger::log_server_start(&listener.local_addr()?, state.root.path(), &state.config);
    serve(listener, state, shutdown).await;
    Ok(())
}

/// Accept loop over an already bound listener.
///
/// When `shutdown` completes the listener is closed, open connections are
/// asked to finish their current request, and the call returns once they
/// have closed or `performance.shutdown_timeout` has elapsed.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &graceful,
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    logger::log_shutdown_started();
    drop(listener);

    let drain_timeout = Duration::from_secs(state.config.performance.shutdown_timeout);
    let drained = tokio::time::timeout(drain_timeout, graceful.shutdown())
        .await
        .is_ok();
    logger::log_shutdown_complete(drained);
}
