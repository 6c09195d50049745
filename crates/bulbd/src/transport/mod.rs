//! Socket transports for the bulb daemon.
//!
//! Every listener runs on a background thread behind a [`ListenerHandle`].
//! The raw sockets share a non-blocking accept loop that hands each
//! connection to a [`ConnectionHandler`] on its own thread:
//!
//! - [`RpcConnectionHandler`](crate::dispatch::RpcConnectionHandler) reads
//!   JSON lines and answers each one;
//! - [`FeedConnectionHandler`] pushes a state line on every change.
//!
//! [`HttpListener`] instead polls a `tiny_http` server for parsed requests.

mod errors;
mod feed;
mod handler;
pub(crate) mod http;
mod listener;
#[cfg(test)]
mod listener_tests;
#[cfg(test)]
mod test_utils;

pub use self::errors::ListenerError;
pub(crate) use self::feed::FeedConnectionHandler;
pub(crate) use self::handler::{
    ConnectionHandler, ConnectionStream, LineRead, read_line_bounded,
};
pub(crate) use self::http::HttpListener;
pub(crate) use self::listener::{ListenerHandle, SocketListener};
#[cfg(test)]
pub(crate) use self::test_utils::AckHandler;

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
