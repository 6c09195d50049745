//! Shared configuration for the bulb daemon and its CLI.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a
//! configuration file (`--config-path` or the discovered `.bulb.toml`), then
//! `BULB_*` environment variables, then command-line flags. Every endpoint
//! accepts the `tcp://host:port` and `unix:///path` URL forms.

mod defaults;
mod logging;
mod socket;

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_FEED_PORT, DEFAULT_HOST, DEFAULT_HTTP_PORT, DEFAULT_LOG_FILTER, DEFAULT_RPC_PORT,
    default_feed_socket, default_http_socket, default_log_filter, default_log_filter_string,
    default_log_format, default_rpc_socket,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use socket::{SocketEndpoint, SocketParseError, SocketPreparationError};

/// Resolved configuration for `bulbd` and `bulb`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "BULB")]
pub struct Config {
    /// JSON-lines RPC socket shared by the daemon and the CLI bridge.
    #[ortho_config(default = default_rpc_socket())]
    #[serde(default = "default_rpc_socket")]
    pub rpc_socket: SocketEndpoint,
    /// HTTP surface serving `/mcp`, `/health` and `/api/bulb`.
    #[ortho_config(default = default_http_socket())]
    #[serde(default = "default_http_socket")]
    pub http_socket: SocketEndpoint,
    /// Push feed of state snapshots.
    #[ortho_config(default = default_feed_socket())]
    #[serde(default = "default_feed_socket")]
    pub feed_socket: SocketEndpoint,
    /// `tracing` filter directive, e.g. `info` or `bulbd=debug`.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(default = "default_log_filter_string")]
    pub log_filter: String,
    /// Log record format.
    #[ortho_config(default = default_log_format())]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_socket: default_rpc_socket(),
            http_socket: default_http_socket(),
            feed_socket: default_feed_socket(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer fails to parse or merge.
    pub fn load() -> Result<Self, Arc<OrthoError>> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from explicit arguments; the first item is the
    /// program name.
    ///
    /// # Errors
    ///
    /// Returns the loader error when a layer fails to parse or merge.
    pub fn load_from_iter<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// JSON-lines RPC endpoint.
    #[must_use]
    pub fn rpc_socket(&self) -> &SocketEndpoint {
        &self.rpc_socket
    }

    /// HTTP endpoint.
    #[must_use]
    pub fn http_socket(&self) -> &SocketEndpoint {
        &self.http_socket
    }

    /// State feed endpoint.
    #[must_use]
    pub fn feed_socket(&self) -> &SocketEndpoint {
        &self.feed_socket
    }

    /// Log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Log record format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Every endpoint the daemon binds, labelled for diagnostics.
    #[must_use]
    pub fn endpoints(&self) -> [(&'static str, &SocketEndpoint); 3] {
        [
            ("rpc", &self.rpc_socket),
            ("http", &self.http_socket),
            ("feed", &self.feed_socket),
        ]
    }
}
