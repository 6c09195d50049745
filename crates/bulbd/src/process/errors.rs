//! Errors that end a daemon run.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Why [`run_daemon`](super::run_daemon) returned early.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration, telemetry or socket preparation failed.
    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),
    /// A listener could not bind, start or be joined.
    #[error("listener failed: {0}")]
    Listener(#[from] ListenerError),
    /// Termination signals could not be watched.
    #[error("cannot watch for shutdown signals: {0}")]
    Shutdown(#[from] ShutdownError),
}
