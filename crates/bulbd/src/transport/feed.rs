//! Subscription feed: pushes a JSON line per state change.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use bulb_core::{BulbService, BulbState, FeedEvent};
use serde::Serialize;
use tracing::{debug, warn};

use super::{ConnectionHandler, ConnectionStream, LISTENER_TARGET};

/// Longest wait for a snapshot before checking that the subscriber is
/// still connected.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
/// Time an idle tick spends reading from the subscriber.
const HANGUP_CHECK: Duration = Duration::from_millis(5);

/// Line written for every snapshot.
#[derive(Debug, Serialize)]
struct StateLine<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a BulbState,
}

impl<'a> StateLine<'a> {
    fn new(data: &'a BulbState) -> Self {
        Self { kind: "state", data }
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut line = serde_json::to_vec(self).map_err(io::Error::other)?;
        line.push(b'\n');
        writer.write_all(&line)?;
        writer.flush()
    }
}

/// Sends the current state on connect, then every published snapshot until
/// the peer disconnects or the feed closes.
#[derive(Debug)]
pub(crate) struct FeedConnectionHandler {
    service: Arc<BulbService>,
}

impl FeedConnectionHandler {
    pub(crate) fn new(service: Arc<BulbService>) -> Self {
        Self { service }
    }

    fn stream(&self, mut stream: ConnectionStream) -> io::Result<()> {
        // Subscribe before the first snapshot so no change falls between.
        let subscription = self.service.subscribe();
        let initial = self.service.snapshot().map_err(io::Error::other)?;
        StateLine::new(&initial).write_to(&mut stream)?;

        loop {
            match subscription.next_timeout(POLL_INTERVAL) {
                FeedEvent::Snapshot(state) => StateLine::new(&state).write_to(&mut stream)?,
                FeedEvent::Idle => {
                    if stream.peer_closed(HANGUP_CHECK)? {
                        debug!(target: LISTENER_TARGET, "feed subscriber hung up");
                        return Ok(());
                    }
                }
                FeedEvent::Closed => {
                    debug!(target: LISTENER_TARGET, "feed closed");
                    return stream.shutdown_write();
                }
            }
        }
    }
}

impl ConnectionHandler for FeedConnectionHandler {
    fn handle(&self, stream: ConnectionStream) {
        match self.stream(stream) {
            Ok(()) => {}
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::BrokenPipe
                        | io::ErrorKind::ConnectionReset
                        | io::ErrorKind::ConnectionAborted
                ) =>
            {
                debug!(target: LISTENER_TARGET, "feed subscriber disconnected");
            }
            Err(error) => warn!(target: LISTENER_TARGET, %error, "feed connection failed"),
        }
    }
}
