//! Transport layer abstraction.
//!
//! Defines the `LampTransport` trait for talking to the lamp's bridge,
//! allowing different implementations (TCP, mock, etc.).

use crate::protocol::Reply;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Stream closed by peer")]
    Closed,

    #[error("Timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstract byte-stream transport to the lamp.
///
/// The protocol is half duplex: every write is followed by exactly one
/// read of the device's answer.
pub trait LampTransport: Send {
    /// Write a complete frame.
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError>;

    /// Read exactly `len` bytes. Fails with `Closed` if the peer hangs up first.
    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError>;

    /// Read one line, terminator stripped.
    ///
    /// A final line ended by the peer closing the stream is still returned;
    /// end of stream with nothing buffered is `Closed`.
    fn read_line(&mut self) -> Result<Reply, TransportError>;

    /// Release the connection. Further I/O is an error.
    fn close(&mut self) -> Result<(), TransportError>;

    /// Human readable peer description, for logs.
    fn peer(&self) -> String;
}
