#[cfg(unix)]
use std::env;

#[cfg(unix)]
use camino::Utf8PathBuf;

#[cfg(unix)]
use libc::geteuid;

#[cfg(unix)]
use dirs::runtime_dir;

use crate::logging::LogFormat;
use crate::socket::SocketEndpoint;

/// Loopback interface used by the TCP defaults.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// JSON-RPC port used when Unix domain sockets are not available.
pub const DEFAULT_RPC_PORT: u16 = 9780;

/// Port of the HTTP surface.
pub const DEFAULT_HTTP_PORT: u16 = 3001;

/// Port of the state feed.
pub const DEFAULT_FEED_PORT: u16 = 8080;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value for serde defaults.
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Endpoint of the HTTP surface.
#[must_use]
pub fn default_http_socket() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_HTTP_PORT)
}

/// Endpoint of the state feed.
#[must_use]
pub fn default_feed_socket() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_FEED_PORT)
}

/// Endpoint of the JSON-lines RPC socket.
///
/// On Unix this is `bulb/bulbd.sock` under the user runtime directory, or a
/// per-user directory below the system temporary directory when no runtime
/// directory is available.
#[must_use]
pub fn default_rpc_socket() -> SocketEndpoint {
    rpc_socket_for_platform()
}

#[cfg(unix)]
fn rpc_socket_for_platform() -> SocketEndpoint {
    let mut base = runtime_dir()
        .and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
        .map_or_else(
            || {
                let mut fallback = Utf8PathBuf::from_path_buf(env::temp_dir())
                    .unwrap_or_else(|_| Utf8PathBuf::from("/tmp"));
                fallback.push("bulb");
                fallback.push(user_namespace());
                fallback
            },
            |runtime| runtime.join("bulb"),
        );
    base.push("bulbd.sock");
    SocketEndpoint::unix(base)
}

#[cfg(unix)]
fn user_namespace() -> String {
    // SAFETY: `geteuid` has no preconditions and cannot fail.
    let uid = unsafe { geteuid() };
    format!("uid-{uid}")
}

#[cfg(not(unix))]
fn rpc_socket_for_platform() -> SocketEndpoint {
    SocketEndpoint::tcp(DEFAULT_HOST, DEFAULT_RPC_PORT)
}
