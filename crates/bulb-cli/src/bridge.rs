//! Stdio bridge to the daemon's RPC socket.
//!
//! Request lines read from stdin are forwarded to the daemon unchanged and
//! every daemon line is copied to stdout. Replies are not matched to
//! requests; the daemon owns ids and notification handling. End of input
//! half-closes the connection so the daemon can finish answering before the
//! bridge exits.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::thread;

use crate::AppError;
use crate::transport::Connection;

pub(crate) fn relay<R, W>(
    mut connection: Connection,
    input: R,
    output: &mut W,
) -> Result<(), AppError>
where
    R: BufRead,
    W: Write + Send,
{
    let replies = connection.try_clone().map_err(AppError::ReadReply)?;
    thread::scope(|scope| {
        let forwarder = scope.spawn(move || copy_replies(replies, output));
        let sent = send_requests(input, &mut connection);
        let closed = half_close(&connection);
        let forwarded = forwarder
            .join()
            .map_err(|_| AppError::RelayPanic)?
            .map_err(AppError::from);
        sent.and(closed).and(forwarded)
    })
}

fn send_requests<R: BufRead, W: Write>(input: R, daemon: &mut W) -> Result<(), AppError> {
    for line in input.lines() {
        let line = line.map_err(AppError::ReadInput)?;
        if line.trim().is_empty() {
            continue;
        }
        daemon
            .write_all(line.as_bytes())
            .and_then(|()| daemon.write_all(b"\n"))
            .and_then(|()| daemon.flush())
            .map_err(AppError::SendRequest)?;
    }
    Ok(())
}

// Runs on the relay thread, so it reports plain IO errors.
enum ForwardError {
    Read(io::Error),
    Write(io::Error),
}

impl From<ForwardError> for AppError {
    fn from(error: ForwardError) -> Self {
        match error {
            ForwardError::Read(source) => Self::ReadReply(source),
            ForwardError::Write(source) => Self::WriteOutput(source),
        }
    }
}

fn copy_replies<R: Read, W: Write>(daemon: R, output: &mut W) -> Result<(), ForwardError> {
    let mut reader = BufReader::new(daemon);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader
            .read_until(b'\n', &mut line)
            .map_err(ForwardError::Read)?
            == 0
        {
            return output.flush().map_err(ForwardError::Write);
        }
        if !line.ends_with(b"\n") {
            line.push(b'\n');
        }
        output
            .write_all(&line)
            .and_then(|()| output.flush())
            .map_err(ForwardError::Write)?;
    }
}

// A daemon that already hung up leaves nothing to signal.
fn half_close(connection: &Connection) -> Result<(), AppError> {
    match connection.shutdown_write() {
        Err(error) if error.kind() != io::ErrorKind::NotConnected => {
            Err(AppError::SendRequest(error))
        }
        _ => Ok(()),
    }
}
