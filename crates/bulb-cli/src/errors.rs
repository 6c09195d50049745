//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to resolve daemon address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to daemon at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    #[error("failed to serialise request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to send request to daemon: {0}")]
    SendRequest(io::Error),
    #[error("failed to read reply from daemon: {0}")]
    ReadReply(io::Error),
    #[error("failed to parse daemon reply: {0}")]
    ParseReply(serde_json::Error),
    #[error("daemon closed the connection without replying")]
    MissingReply,
    #[error("daemon reply did not contain {0}")]
    UnexpectedReply(&'static str),
    #[error("failed to read standard input: {0}")]
    ReadInput(io::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
    #[error("bridge relay thread panicked")]
    RelayPanic,
    #[error("{message}")]
    Remote { code: i64, message: String },
}
