//! Connection handler for the JSON-lines RPC socket.

use std::io::{self, BufReader};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::transport::{ConnectionHandler, ConnectionStream, LineRead, read_line_bounded};

use super::dispatcher::{DispatchOutcome, RequestDispatcher};
use super::errors::DispatchError;
use super::request::RequestId;
use super::response::{ReplyEnvelope, ResponseWriter};
use super::router::DISPATCH_TARGET;

/// Maximum size of a single request line in bytes.
pub(crate) const MAX_REQUEST_BYTES: usize = 1024 * 1024;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Serves JSON-lines requests until the peer disconnects.
///
/// Every line is one request. Replies are written in request order; blank
/// lines are skipped. A line above [`MAX_REQUEST_BYTES`] is answered with an
/// invalid-request reply and the connection is closed.
#[derive(Debug)]
pub(crate) struct RpcConnectionHandler {
    dispatcher: Arc<RequestDispatcher>,
}

impl RpcConnectionHandler {
    /// Creates a handler that forwards lines to `dispatcher`.
    pub(crate) fn new(dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { dispatcher }
    }

    fn serve(&self, stream: ConnectionStream) -> io::Result<()> {
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = ResponseWriter::new(stream);
        loop {
            match read_line_bounded(&mut reader, MAX_REQUEST_BYTES)? {
                LineRead::Eof => {
                    debug!(target: DISPATCH_TARGET, "client disconnected");
                    return Ok(());
                }
                LineRead::TooLong => {
                    warn!(
                        target: DISPATCH_TARGET,
                        limit = MAX_REQUEST_BYTES,
                        "request line too large"
                    );
                    let error = DispatchError::invalid_request(format!(
                        "request line exceeds {MAX_REQUEST_BYTES} bytes"
                    ));
                    writer.write_reply(&ReplyEnvelope::failure(RequestId::Null, &error))?;
                    let mut input = reader.into_inner();
                    input.shutdown_write()?;
                    input.drain(DRAIN_TIMEOUT, MAX_REQUEST_BYTES as u64 * 16);
                    return Ok(());
                }
                LineRead::Line(line) if line.trim_ascii().is_empty() => {}
                LineRead::Line(line) => {
                    if let DispatchOutcome::Reply(reply) = self.dispatcher.dispatch(&line) {
                        writer.write_reply(&reply)?;
                    }
                }
            }
        }
    }
}

impl ConnectionHandler for RpcConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        if let Err(error) = self.serve(stream) {
            warn!(target: DISPATCH_TARGET, %error, "rpc connection failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, Write};
    use std::net::{Shutdown, TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use bulb_core::BulbService;
    use rstest::{fixture, rstest};
    use serde_json::Value;

    use super::*;
    use crate::dispatch::errors::INVALID_REQUEST;

    /// TCP server/client pair with the handler serving one connection.
    struct HandlerTestHarness {
        client: TcpStream,
        server: Option<JoinHandle<()>>,
    }

    impl HandlerTestHarness {
        fn exchange(&mut self, request: &[u8]) -> Vec<Value> {
            self.client.write_all(request).expect("write request");
            self.client.shutdown(Shutdown::Write).expect("half close");
            let reader = io::BufReader::new(&mut self.client);
            reader
                .lines()
                .map(|line| serde_json::from_str(&line.expect("read line")).expect("json reply"))
                .collect()
        }
    }

    impl Drop for HandlerTestHarness {
        fn drop(&mut self) {
            if let Some(server) = self.server.take() {
                server.join().expect("join server");
            }
        }
    }

    #[fixture]
    fn harness() -> HandlerTestHarness {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let dispatcher = Arc::new(RequestDispatcher::new(Arc::new(BulbService::new())));
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept");
            RpcConnectionHandler::new(dispatcher).handle(ConnectionStream::Tcp(stream));
        });
        HandlerTestHarness {
            client: TcpStream::connect(addr).expect("connect"),
            server: Some(server),
        }
    }

    #[rstest]
    fn replies_follow_request_order(mut harness: HandlerTestHarness) {
        let replies = harness.exchange(
            b"{\"id\":1,\"method\":\"ping\"}\n\
              {\"method\":\"notifications/initialized\"}\n\
              \n\
              {\"id\":\"two\",\"method\":\"tools/list\"}\n",
        );
        let ids: Vec<_> = replies.iter().map(|reply| reply["id"].clone()).collect();
        assert_eq!(ids, [Value::from(1), Value::from("two")]);
    }

    #[rstest]
    fn oversized_lines_close_the_connection(mut harness: HandlerTestHarness) {
        let mut request = vec![b' '; MAX_REQUEST_BYTES + 1];
        request.extend_from_slice(b"\n{\"id\":2,\"method\":\"ping\"}\n");
        let replies = harness.exchange(&request);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], Value::Null);
        assert_eq!(replies[0]["error"]["code"], INVALID_REQUEST);
    }

    #[rstest]
    fn unterminated_final_lines_are_answered(mut harness: HandlerTestHarness) {
        let replies = harness.exchange(b"{\"id\":7,\"method\":\"ping\"}");
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], 7);
    }
}
