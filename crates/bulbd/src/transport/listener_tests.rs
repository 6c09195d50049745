//! Tests for the socket listener.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use rstest::{fixture, rstest};

use bulb_config::SocketEndpoint;

use super::listener::SocketListener;
use super::{AckHandler, ConnectionHandler, ListenerError};

#[fixture]
fn tcp_endpoint() -> SocketEndpoint {
    SocketEndpoint::tcp("127.0.0.1", 0)
}

// Sends one line and returns the handler's answer.
fn exchange<S: Read + Write>(mut stream: S, line: &str) -> String {
    stream
        .write_all(format!("{line}\n").as_bytes())
        .expect("write line");
    let mut answer = String::new();
    BufReader::new(stream)
        .read_line(&mut answer)
        .expect("read answer");
    answer
}

fn tcp_client(addr: std::net::SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).expect("connect client");
    stream
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("read timeout");
    stream
}

#[rstest]
fn tcp_listener_accepts_connections(tcp_endpoint: SocketEndpoint) {
    let listener = SocketListener::bind("test", &tcp_endpoint).expect("bind tcp listener");
    let addr = listener
        .local_addr()
        .expect("listener should report local address");
    let handler: Arc<dyn ConnectionHandler> = Arc::new(AckHandler);
    let handle = listener.start(handler).expect("start listener");

    // Two clients held open at once are served on separate threads.
    let first = tcp_client(addr);
    let second = tcp_client(addr);
    assert_eq!(exchange(second, "two"), "ack two\n");
    assert_eq!(exchange(first, "one"), "ack one\n");
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn ephemeral_ports_are_resolved_in_the_handle(tcp_endpoint: SocketEndpoint) {
    let listener = SocketListener::bind("rpc", &tcp_endpoint).expect("bind tcp listener");
    let port = listener.local_addr().expect("local addr").port();
    let handle = listener.start(Arc::new(AckHandler)).expect("start listener");

    assert_eq!(handle.label(), "rpc");
    assert_eq!(handle.endpoint(), &SocketEndpoint::tcp("127.0.0.1", port));
    handle.shutdown();
    handle.join().expect("join listener");
}

#[rstest]
fn occupied_tcp_ports_fail_to_bind() {
    let occupied = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind");
    let port = occupied.local_addr().expect("local addr").port();
    let error = SocketListener::bind("http", &SocketEndpoint::tcp("127.0.0.1", port))
        .expect_err("port is taken");
    assert!(matches!(error, ListenerError::Bind { .. }), "{error}");
}

#[cfg(unix)]
#[fixture]
fn unix_tempdir() -> tempfile::TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[cfg(unix)]
fn unix_endpoint(path: &std::path::Path) -> SocketEndpoint {
    SocketEndpoint::unix(path.to_str().expect("utf8 path"))
}

#[cfg(unix)]
#[rstest]
fn unix_listener_cleans_stale_socket_files(unix_tempdir: tempfile::TempDir) {
    let path = unix_tempdir.path().join("bulbd.sock");
    {
        let _stale = std::os::unix::net::UnixListener::bind(&path).expect("bind stale listener");
    }
    assert!(path.exists(), "stale socket should remain");

    let listener = SocketListener::bind("rpc", &unix_endpoint(&path)).expect("bind new listener");
    let handle = listener.start(Arc::new(AckHandler)).expect("start listener");

    let client = std::os::unix::net::UnixStream::connect(&path).expect("connect unix client");
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .expect("read timeout");
    assert_eq!(exchange(client, "ping"), "ack ping\n");

    handle.shutdown();
    handle.join().expect("join listener");
    assert!(
        !path.exists(),
        "listener should remove unix socket on shutdown"
    );
}

#[cfg(unix)]
#[rstest]
fn unix_listener_rejects_in_use_socket(unix_tempdir: tempfile::TempDir) {
    let path = unix_tempdir.path().join("bulbd.sock");
    let _existing = std::os::unix::net::UnixListener::bind(&path).expect("bind existing listener");

    let error = SocketListener::bind("rpc", &unix_endpoint(&path)).expect_err("should fail bind");
    assert!(matches!(error, ListenerError::SocketBusy { .. }));
}

#[cfg(unix)]
#[rstest]
fn unix_listener_refuses_regular_files(unix_tempdir: tempfile::TempDir) {
    let path = unix_tempdir.path().join("bulbd.sock");
    std::fs::write(&path, b"not a socket").expect("write file");

    let error = SocketListener::bind("rpc", &unix_endpoint(&path)).expect_err("should fail bind");
    assert!(matches!(error, ListenerError::NotASocket { .. }));
}
