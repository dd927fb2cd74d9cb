//! TCP transport to the lamp's WiFish bridge.

use std::io::{self, BufRead, BufReader, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::{debug, info, instrument};

use super::traits::{LampTransport, TransportError};
use crate::protocol::Reply;

/// Blocking TCP transport. The socket closes when the value is dropped.
pub struct TcpTransport {
    reader: BufReader<TcpStream>,
    peer: SocketAddr,
    read_timeout: Option<Duration>,
}

impl TcpTransport {
    /// Open a connection to `addr`.
    #[instrument(level = "info", skip(connect_timeout, read_timeout))]
    pub fn connect(
        addr: SocketAddr,
        connect_timeout: Option<Duration>,
        read_timeout: Option<Duration>,
    ) -> io::Result<Self> {
        let stream = match connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout)?,
            None => TcpStream::connect(addr)?,
        };
        info!(peer = %addr, "Connected");
        Self::from_stream(stream, read_timeout)
    }

    /// Wrap an already connected stream.
    pub fn from_stream(stream: TcpStream, read_timeout: Option<Duration>) -> io::Result<Self> {
        stream.set_read_timeout(read_timeout)?;
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        Ok(Self {
            reader: BufReader::new(stream),
            peer,
            read_timeout,
        })
    }

    fn map_error(&self, e: io::Error) -> TransportError {
        map_io_error(e, self.read_timeout)
    }
}

/// Classify a socket error. A peer that hangs up, cleanly or with a reset,
/// is `Closed`.
fn map_io_error(e: io::Error, read_timeout: Option<Duration>) -> TransportError {
    match e.kind() {
        ErrorKind::UnexpectedEof
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted
        | ErrorKind::BrokenPipe => TransportError::Closed,
        ErrorKind::WouldBlock | ErrorKind::TimedOut => TransportError::Timeout {
            timeout_ms: read_timeout
                .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or_default(),
        },
        _ => TransportError::Io(e),
    }
}

impl LampTransport for TcpTransport {
    #[instrument(level = "debug", skip(self, data), fields(len = data.len()))]
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        let stream = self.reader.get_mut();
        if let Err(e) = stream.write_all(data).and_then(|()| stream.flush()) {
            return Err(self.map_error(e));
        }
        debug!(bytes_written = data.len(), "Write complete");
        Ok(data.len())
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; len];
        if let Err(e) = self.reader.read_exact(&mut buf) {
            return Err(self.map_error(e));
        }
        debug!(bytes_read = len, "Read complete");
        Ok(buf)
    }

    fn read_line(&mut self) -> Result<Reply, TransportError> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line) {
            Ok(0) => Err(TransportError::Closed),
            Ok(n) => {
                debug!(bytes_read = n, "Line received");
                Ok(Reply::from_line(line))
            }
            Err(e) => Err(self.map_error(e)),
        }
    }

    fn close(&mut self) -> Result<(), TransportError> {
        match self.reader.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // Peer already gone.
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn peer(&self) -> String {
        self.peer.to_string()
    }
}
