//! Connection handling abstractions shared by every listener.

use std::io::{self, BufRead, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use tracing::debug;

use super::LISTENER_TARGET;

/// Stream types accepted by the listeners.
#[derive(Debug)]
pub(crate) enum ConnectionStream {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ConnectionStream {
    /// Opens a second handle on the same socket so reads and writes can be
    /// owned separately.
    pub(crate) fn try_clone(&self) -> io::Result<Self> {
        match self {
            Self::Tcp(stream) => stream.try_clone().map(Self::Tcp),
            #[cfg(unix)]
            Self::Unix(stream) => stream.try_clone().map(Self::Unix),
        }
    }

    pub(crate) fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.set_read_timeout(timeout),
            #[cfg(unix)]
            Self::Unix(stream) => stream.set_read_timeout(timeout),
        }
    }

    /// Signals end of output to the peer while keeping the read half open.
    pub(crate) fn shutdown_write(&self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.shutdown(Shutdown::Write),
            #[cfg(unix)]
            Self::Unix(stream) => stream.shutdown(Shutdown::Write),
        }
    }

    /// Discards unread input until the peer finishes or `timeout` passes.
    ///
    /// Closing a socket with unread input resets the connection, which can
    /// destroy a reply the peer has not read yet.
    pub(crate) fn drain(&mut self, timeout: Duration, limit: u64) {
        if self.set_read_timeout(Some(timeout)).is_err() {
            return;
        }
        // The reply is already written; a failed drain only risks a reset.
        if let Err(error) = io::copy(&mut self.take(limit), &mut io::sink()) {
            debug!(target: LISTENER_TARGET, %error, "stopped draining connection");
        }
    }

    /// Reports whether the peer has closed its end, waiting at most `wait`.
    ///
    /// Only for connections whose input is otherwise ignored: anything the
    /// peer sent is consumed and discarded.
    pub(crate) fn peer_closed(&mut self, wait: Duration) -> io::Result<bool> {
        self.set_read_timeout(Some(wait))?;
        let mut scratch = [0; 64];
        match self.read(&mut scratch) {
            Ok(0) => Ok(true),
            Ok(_) => Ok(false),
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock
                        | io::ErrorKind::TimedOut
                        | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            Self::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            Self::Unix(stream) => stream.flush(),
        }
    }
}

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Handles a single connection. Implementations should avoid panicking.
    fn handle(&self, stream: ConnectionStream);
}

/// Outcome of a bounded line read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineRead {
    /// A line without its terminating newline. A final unterminated line is
    /// returned as well.
    Line(Vec<u8>),
    /// The peer closed the stream with nothing buffered.
    Eof,
    /// The line exceeded the limit; the stream is left mid-line.
    TooLong,
}

/// Reads one newline-terminated line of at most `limit` bytes.
///
/// Interrupted reads are retried.
pub(crate) fn read_line_bounded<R: BufRead>(reader: &mut R, limit: usize) -> io::Result<LineRead> {
    let mut line = Vec::new();
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        if available.is_empty() {
            return Ok(if line.is_empty() {
                LineRead::Eof
            } else {
                LineRead::Line(line)
            });
        }

        let newline = available.iter().position(|byte| *byte == b'\n');
        let content = newline.unwrap_or(available.len());
        let consumed = newline.map_or(content, |position| position + 1);
        let too_long = line.len() + content > limit;
        if !too_long {
            line.extend_from_slice(&available[..content]);
        }
        reader.consume(consumed);

        if too_long {
            return Ok(LineRead::TooLong);
        }
        if newline.is_some() {
            return Ok(LineRead::Line(line));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use rstest::rstest;

    use super::*;

    /// Reader that fails with `Interrupted` before every successful fill.
    struct Flaky {
        inner: Cursor<Vec<u8>>,
        interrupt: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            let len = buf.len().min(3);
            self.inner.read(&mut buf[..len])
        }
    }

    #[rstest]
    #[case(b"one\ntwo\n".as_slice(), vec![LineRead::Line(b"one".to_vec()), LineRead::Line(b"two".to_vec()), LineRead::Eof])]
    #[case(b"tail".as_slice(), vec![LineRead::Line(b"tail".to_vec()), LineRead::Eof])]
    #[case(b"\n".as_slice(), vec![LineRead::Line(Vec::new()), LineRead::Eof])]
    #[case(b"".as_slice(), vec![LineRead::Eof])]
    fn lines_are_split_on_newlines(#[case] input: &[u8], #[case] expected: Vec<LineRead>) {
        let mut reader = Cursor::new(input.to_vec());
        let lines: Vec<_> = expected
            .iter()
            .map(|_| read_line_bounded(&mut reader, 64).expect("read"))
            .collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn oversized_lines_are_flagged() {
        let mut reader = Cursor::new(b"0123456789\nok\n".to_vec());
        assert_eq!(
            read_line_bounded(&mut reader, 4).expect("read"),
            LineRead::TooLong
        );
    }

    #[test]
    fn lines_at_the_limit_are_accepted() {
        let mut reader = Cursor::new(b"abcd\n".to_vec());
        assert_eq!(
            read_line_bounded(&mut reader, 4).expect("read"),
            LineRead::Line(b"abcd".to_vec())
        );
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let flaky = Flaky {
            inner: Cursor::new(b"{\"id\":1}\n".to_vec()),
            interrupt: false,
        };
        let mut reader = BufReader::with_capacity(4, flaky);
        assert_eq!(
            read_line_bounded(&mut reader, 64).expect("read"),
            LineRead::Line(b"{\"id\":1}".to_vec())
        );
    }

    #[test]
    fn peer_closed_tells_silence_from_hangup() {
        let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind");
        let mut client =
            TcpStream::connect(listener.local_addr().expect("local addr")).expect("connect");
        let (accepted, _) = listener.accept().expect("accept");
        let mut stream = ConnectionStream::Tcp(accepted);
        let wait = Duration::from_millis(20);

        assert!(!stream.peer_closed(wait).expect("silent peer"));
        client.write_all(b"noise").expect("write");
        assert!(!stream.peer_closed(Duration::from_secs(1)).expect("chatty peer"));

        drop(client);
        assert!(stream.peer_closed(Duration::from_secs(1)).expect("closed peer"));
    }
}
