//! Shared helpers for the daemon behaviour suites.

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bulb_config::{Config, SocketEndpoint};
use ortho_config::OrthoError;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::health::HealthReporter;
use crate::transport::ListenerError;

const CLIENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ListenerReady(&'static str),
    ListenerFailed(&'static str),
    ShutdownCompleted,
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn listener_ready(&self, label: &'static str, _endpoint: &SocketEndpoint) {
        self.record(HealthEvent::ListenerReady(label));
    }

    fn listener_failed(&self, label: &'static str, _error: &ListenerError) {
        self.record(HealthEvent::ListenerFailed(label));
    }

    fn shutdown_completed(&self) {
        self.record(HealthEvent::ShutdownCompleted);
    }
}

/// Configuration with every endpoint on an ephemeral loopback port.
pub fn loopback_config() -> Config {
    Config {
        rpc_socket: SocketEndpoint::tcp("127.0.0.1", 0),
        http_socket: SocketEndpoint::tcp("127.0.0.1", 0),
        feed_socket: SocketEndpoint::tcp("127.0.0.1", 0),
        ..Config::default()
    }
}

/// Loader that fails by passing an unsupported socket scheme.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            OsString::from("bulbd"),
            OsString::from("--http-socket"),
            OsString::from("invalid://socket"),
        ])
    }
}

pub fn socket_addr(endpoint: &SocketEndpoint) -> SocketAddr {
    let SocketEndpoint::Tcp { host, port } = endpoint else {
        panic!("expected a TCP endpoint, got {endpoint}");
    };
    (host.as_str(), *port)
        .to_socket_addrs()
        .expect("resolve endpoint")
        .next()
        .expect("endpoint address")
}

/// Opens a client connection with read and write timeouts.
pub fn connect(endpoint: &SocketEndpoint) -> TcpStream {
    let stream = TcpStream::connect(socket_addr(endpoint)).expect("connect");
    stream
        .set_read_timeout(Some(CLIENT_TIMEOUT))
        .expect("read timeout");
    stream
        .set_write_timeout(Some(CLIENT_TIMEOUT))
        .expect("write timeout");
    stream
}

/// Sends one JSON line and reads one reply line.
pub fn rpc_exchange(endpoint: &SocketEndpoint, request: &str) -> serde_json::Value {
    let mut stream = connect(endpoint);
    stream
        .write_all(format!("{request}\n").as_bytes())
        .expect("write request");
    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line).expect("read reply");
    serde_json::from_str(&line).expect("json reply")
}

/// Response status and body of a raw HTTP exchange.
#[derive(Debug)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Sends one HTTP request and reads the response it frames with
/// `Content-Length`.
pub fn http_exchange(endpoint: &SocketEndpoint, method: &str, path: &str, body: &str) -> HttpReply {
    let mut stream = connect(endpoint);
    let request = format!(
        "{method} {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(request.as_bytes()).expect("write request");

    let mut reader = BufReader::new(stream);
    let mut status_line = String::new();
    reader.read_line(&mut status_line).expect("read status line");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .expect("status code");

    let mut length = 0;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).expect("read header");
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            length = value.trim().parse().expect("numeric content length");
        }
    }
    let mut body = vec![0; length];
    reader.read_exact(&mut body).expect("read body");
    HttpReply {
        status,
        body: String::from_utf8(body).expect("utf8 body"),
    }
}
