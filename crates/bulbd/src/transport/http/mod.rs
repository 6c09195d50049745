//! HTTP surface served by `tiny_http`.
//!
//! `tiny_http` parses requests and manages keep-alive. Each request it
//! hands over is read and routed on its own thread, so a slow body never
//! holds up other clients.

mod errors;
mod request;
mod response;
mod routes;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use bulb_config::SocketEndpoint;
use tiny_http::{Request, Server};
use tracing::{debug, info, warn};

use crate::dispatch::RequestDispatcher;

#[cfg(unix)]
use super::listener::{cleanup_unix_socket, clear_stale_socket};
use super::listener::resolve_tcp;
use super::{LISTENER_TARGET, ListenerError, ListenerHandle};

use self::request::HttpRequest;

/// How often the serving loop checks for shutdown while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const ERROR_BACKOFF: Duration = Duration::from_millis(150);

/// A bound HTTP endpoint that has not started serving yet.
pub(crate) struct HttpListener {
    label: &'static str,
    endpoint: SocketEndpoint,
    server: Server,
    dispatcher: Arc<RequestDispatcher>,
}

impl HttpListener {
    /// Binds `endpoint`, replacing a stale unix socket file first.
    pub(crate) fn bind(
        label: &'static str,
        endpoint: &SocketEndpoint,
        dispatcher: Arc<RequestDispatcher>,
    ) -> Result<Self, ListenerError> {
        let server = match endpoint {
            SocketEndpoint::Tcp { host, port } => {
                Server::http(resolve_tcp(endpoint, host, *port)?)
            }
            SocketEndpoint::Unix { path } => {
                #[cfg(unix)]
                {
                    clear_stale_socket(endpoint, path.as_std_path())?;
                    Server::http_unix(path.as_std_path())
                }

                #[cfg(not(unix))]
                {
                    let _ = path;
                    return Err(ListenerError::UnixUnsupported {
                        endpoint: endpoint.clone(),
                    });
                }
            }
        }
        .map_err(|source| ListenerError::Bind {
            endpoint: endpoint.clone(),
            source: io::Error::other(source),
        })?;

        let endpoint = match (endpoint, server.server_addr().to_ip()) {
            (SocketEndpoint::Tcp { host, .. }, Some(addr)) => {
                SocketEndpoint::tcp(host.clone(), addr.port())
            }
            (endpoint, _) => endpoint.clone(),
        };
        Ok(Self {
            label,
            endpoint,
            server,
            dispatcher,
        })
    }

    pub(crate) fn label(&self) -> &'static str {
        self.label
    }

    /// Endpoint as bound, with an ephemeral TCP port resolved.
    pub(crate) fn endpoint(&self) -> &SocketEndpoint {
        &self.endpoint
    }

    pub(crate) fn start(self) -> Result<ListenerHandle, ListenerError> {
        let endpoint = self.endpoint.clone();
        ListenerHandle::spawn(self.label, endpoint, move |shutdown| self.run(shutdown))
    }

    fn run(self, shutdown: &AtomicBool) {
        let Self {
            label,
            endpoint,
            server,
            dispatcher,
        } = self;
        info!(
            target: LISTENER_TARGET,
            listener = label,
            endpoint = %endpoint,
            "http listener active"
        );
        while !shutdown.load(Ordering::SeqCst) {
            match server.recv_timeout(POLL_INTERVAL) {
                Ok(Some(request)) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    thread::spawn(move || serve(&dispatcher, request));
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        target: LISTENER_TARGET,
                        listener = label,
                        %error,
                        "http receive error"
                    );
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }
        drop(server);
        info!(target: LISTENER_TARGET, listener = label, "http listener stopped");
        #[cfg(unix)]
        cleanup_unix_socket(&endpoint);
    }
}

fn serve(dispatcher: &RequestDispatcher, mut request: Request) {
    let response = match HttpRequest::read(&mut request) {
        Ok(parsed) => {
            let response = routes::respond(dispatcher, &parsed);
            debug!(
                target: LISTENER_TARGET,
                method = %parsed.method,
                path = %parsed.path,
                status = response.status(),
                "http request served"
            );
            response
        }
        Err(error) => {
            warn!(target: LISTENER_TARGET, %error, "rejected http request");
            routes::rejection(&error)
        }
    };
    if let Err(error) = request.respond(response.into_response()) {
        debug!(target: LISTENER_TARGET, %error, "http client left before the response");
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;

    use bulb_core::BulbService;
    use rstest::{fixture, rstest};

    use super::*;

    struct Serving {
        handle: ListenerHandle,
        service: Arc<BulbService>,
    }

    impl Serving {
        fn port(&self) -> u16 {
            match self.handle.endpoint() {
                SocketEndpoint::Tcp { port, .. } => *port,
                SocketEndpoint::Unix { .. } => panic!("expected a TCP endpoint"),
            }
        }

        /// Writes `raw` from a helper thread and returns the response status.
        fn send(&self, raw: Vec<u8>) -> u16 {
            let stream = TcpStream::connect(("127.0.0.1", self.port())).expect("connect");
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("read timeout");
            let mut writer = stream.try_clone().expect("clone stream");
            // The server may answer before it has read the whole body.
            thread::spawn(move || writer.write_all(&raw));
            status_of(stream)
        }

        fn stop(self) {
            self.handle.shutdown();
            self.handle.join().expect("join http listener");
        }
    }

    fn status_of(stream: impl std::io::Read) -> u16 {
        let mut status_line = String::new();
        BufReader::new(stream)
            .read_line(&mut status_line)
            .expect("read status line");
        status_line
            .split_whitespace()
            .nth(1)
            .and_then(|code| code.parse().ok())
            .expect("status code")
    }

    #[fixture]
    fn serving() -> Serving {
        let service = Arc::new(BulbService::new());
        let dispatcher = Arc::new(RequestDispatcher::new(Arc::clone(&service)));
        let listener = HttpListener::bind("http", &SocketEndpoint::tcp("127.0.0.1", 0), dispatcher)
            .expect("bind http listener");
        assert_ne!(listener.endpoint(), &SocketEndpoint::tcp("127.0.0.1", 0));
        Serving {
            handle: listener.start().expect("start http listener"),
            service,
        }
    }

    #[rstest]
    fn chunked_bodies_are_decoded(serving: Serving) {
        let status = serving.send(
            b"POST /api/bulb/brightness HTTP/1.1\r\nHost: localhost\r\n\
              Connection: close\r\nTransfer-Encoding: chunked\r\n\r\n\
              a\r\n{\"brightne\r\n7\r\nss\":40}\r\n0\r\n\r\n"
                .to_vec(),
        );
        assert_eq!(status, 200);
        let state = serving.service.snapshot().expect("snapshot");
        assert_eq!(state.brightness.percent(), 40);
        serving.stop();
    }

    #[rstest]
    fn oversized_bodies_are_refused(serving: Serving) {
        let length = request::MAX_BODY_BYTES + 1;
        let mut raw = format!(
            "POST /mcp HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\
             Content-Length: {length}\r\n\r\n"
        )
        .into_bytes();
        raw.resize(raw.len() + length, b' ');
        assert_eq!(serving.send(raw), 413);
        assert_eq!(
            serving.service.snapshot().expect("snapshot"),
            bulb_core::BulbState::default()
        );
        serving.stop();
    }

    #[cfg(unix)]
    #[test]
    fn unix_endpoints_are_removed_on_shutdown() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("http.sock");
        let endpoint = SocketEndpoint::unix(path.to_str().expect("utf8 path"));
        let dispatcher = Arc::new(RequestDispatcher::new(Arc::new(BulbService::new())));
        let handle = HttpListener::bind("http", &endpoint, dispatcher)
            .expect("bind unix http listener")
            .start()
            .expect("start unix http listener");

        let mut stream = std::os::unix::net::UnixStream::connect(&path).expect("connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("read timeout");
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .expect("write request");
        assert_eq!(status_of(stream), 200);

        handle.shutdown();
        handle.join().expect("join http listener");
        assert!(!path.exists(), "socket file should be removed");
    }
}
