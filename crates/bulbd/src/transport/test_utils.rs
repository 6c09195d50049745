//! Test handlers for the transport module.

use std::io::{BufRead, BufReader, Write};

use super::{ConnectionHandler, ConnectionStream};

/// Answers the first line of each connection with `ack <line>`.
pub(crate) struct AckHandler;

impl ConnectionHandler for AckHandler {
    fn handle(&self, stream: ConnectionStream) {
        let Ok(mut writer) = stream.try_clone() else {
            return;
        };
        let mut line = String::new();
        if BufReader::new(stream).read_line(&mut line).is_ok() {
            let _ = write!(writer, "ack {line}");
        }
    }
}
