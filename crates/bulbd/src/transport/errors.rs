//! Listener failures.

use std::io;

use bulb_config::SocketEndpoint;
use thiserror::Error;

/// Why a socket could not be bound or served.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("cannot resolve {endpoint}: {source}")]
    Resolve {
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    #[error("{endpoint} resolved to no addresses")]
    Unresolved { endpoint: SocketEndpoint },
    #[error("cannot bind {endpoint}: {source}")]
    Bind {
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    #[error("cannot switch the {label} listener to non-blocking mode: {source}")]
    NonBlocking {
        label: &'static str,
        #[source]
        source: io::Error,
    },
    #[cfg(not(unix))]
    #[error("{endpoint} needs unix socket support, which this platform lacks")]
    UnixUnsupported { endpoint: SocketEndpoint },
    /// Another process is accepting on the socket path.
    #[cfg(unix)]
    #[error("{endpoint} is held by a running process")]
    SocketBusy { endpoint: SocketEndpoint },
    #[cfg(unix)]
    #[error("{endpoint} names a file that is not a socket")]
    NotASocket { endpoint: SocketEndpoint },
    /// Probing an existing socket file failed for a reason other than
    /// the socket being stale.
    #[cfg(unix)]
    #[error("cannot inspect existing socket {endpoint}: {source}")]
    Inspect {
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    #[cfg(unix)]
    #[error("cannot remove stale socket {endpoint}: {source}")]
    StaleSocket {
        endpoint: SocketEndpoint,
        #[source]
        source: io::Error,
    },
    #[error("cannot start the {label} listener thread: {source}")]
    Spawn {
        label: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("the {label} listener thread panicked")]
    Panicked { label: &'static str },
}
