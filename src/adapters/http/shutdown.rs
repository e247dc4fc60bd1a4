//! Graceful shutdown trigger for the HTTP server.

use std::future::Future;
use std::io;

use tracing::{error, info};

/// Resolves when `signal` reports a shutdown request.
///
/// A signal that fails to install never resolves, so the server keeps
/// running instead of stopping at startup.
pub async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("shutdown signal received"),
        Err(err) => {
            error!(error = %err, "cannot listen for shutdown signal, running until killed");
            std::future::pending::<()>().await
        }
    }
}
