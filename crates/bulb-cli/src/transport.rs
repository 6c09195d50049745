//! Streams to the daemon's RPC socket.
//!
//! [`connect`] hides whether the configured endpoint is TCP or a unix
//! socket; the bridge and one-shot commands only see a [`Connection`].

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use bulb_config::SocketEndpoint;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

#[cfg(unix)]
use socket2::{Domain, SockAddr, Socket, Type};

use super::AppError;

/// Upper bound on establishing a connection to any one address.
pub(crate) const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub(crate) enum Connection {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

// Both stream types expose the same inherent and trait methods.
macro_rules! on_stream {
    ($connection:expr, $stream:ident => $body:expr) => {
        match $connection {
            Connection::Tcp($stream) => $body,
            #[cfg(unix)]
            Connection::Unix($stream) => $body,
        }
    };
}

impl Connection {
    pub(crate) fn try_clone(&self) -> io::Result<Self> {
        match self {
            Self::Tcp(stream) => stream.try_clone().map(Self::Tcp),
            #[cfg(unix)]
            Self::Unix(stream) => stream.try_clone().map(Self::Unix),
        }
    }

    pub(crate) fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        on_stream!(self, stream => stream.set_read_timeout(timeout))
    }

    /// Tells the daemon no more requests follow; replies can still be read.
    pub(crate) fn shutdown_write(&self) -> io::Result<()> {
        on_stream!(self, stream => stream.shutdown(Shutdown::Write))
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        on_stream!(self, stream => stream.read(buf))
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        on_stream!(self, stream => stream.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        on_stream!(self, stream => stream.flush())
    }
}

/// Opens the daemon's RPC endpoint.
pub(crate) fn connect(endpoint: &SocketEndpoint) -> Result<Connection, AppError> {
    let connect_error = |source| AppError::Connect {
        endpoint: endpoint.to_string(),
        source,
    };
    match endpoint {
        SocketEndpoint::Tcp { host, port } => {
            let addresses: Vec<_> = (host.as_str(), *port)
                .to_socket_addrs()
                .map_err(|source| AppError::Resolve {
                    endpoint: endpoint.to_string(),
                    source,
                })?
                .collect();
            connect_tcp(&addresses).map_err(connect_error)
        }
        #[cfg(unix)]
        SocketEndpoint::Unix { path } => connect_unix(path.as_str()).map_err(connect_error),
        #[cfg(not(unix))]
        SocketEndpoint::Unix { .. } => {
            Err(AppError::UnsupportedUnixTransport(endpoint.to_string()))
        }
    }
}

// Tries each resolved address in turn and reports the last failure.
fn connect_tcp(addresses: &[std::net::SocketAddr]) -> io::Result<Connection> {
    let mut last_error = io::Error::new(
        io::ErrorKind::AddrNotAvailable,
        "host resolved to no addresses",
    );
    for address in addresses {
        match TcpStream::connect_timeout(address, CONNECTION_TIMEOUT) {
            Ok(stream) => return Ok(Connection::Tcp(stream)),
            Err(error) => last_error = error,
        }
    }
    Err(last_error)
}

#[cfg(unix)]
fn connect_unix(path: &str) -> io::Result<Connection> {
    let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
    socket.connect_timeout(&SockAddr::unix(path)?, CONNECTION_TIMEOUT)?;
    Ok(Connection::Unix(socket.into()))
}
