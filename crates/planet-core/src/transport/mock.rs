//! Mock transport for testing.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::traits::{LampTransport, TransportError};
use crate::protocol::Reply;

/// Scripted transport for unit testing the session logic.
///
/// Clones share state, so a test can keep a handle while the session
/// owns the transport.
#[derive(Clone)]
pub struct MockTransport {
    /// Bytes the "device" will send.
    inbound: Arc<Mutex<VecDeque<u8>>>,
    /// Captured writes.
    write_log: Arc<Mutex<Vec<Vec<u8>>>>,
    /// Whether the connection is open.
    connected: Arc<Mutex<bool>>,
    /// Report a timeout instead of a closed stream once the script runs dry.
    stall_when_empty: bool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            write_log: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(Mutex::new(true)),
            stall_when_empty: false,
        }
    }

    /// Mock that behaves like a silent peer with a read deadline.
    pub fn stalling() -> Self {
        Self {
            stall_when_empty: true,
            ..Self::new()
        }
    }

    /// Queue raw bytes for the next reads.
    pub fn queue_bytes(&self, bytes: &[u8]) {
        self.inbound.lock().unwrap().extend(bytes.iter().copied());
    }

    /// Queue a reply line terminated with CRLF.
    pub fn queue_line(&self, line: &str) {
        self.queue_bytes(line.as_bytes());
        self.queue_bytes(b"\r\n");
    }

    /// Get all captured writes.
    pub fn get_writes(&self) -> Vec<Vec<u8>> {
        self.write_log.lock().unwrap().clone()
    }

    /// Simulate the peer hanging up.
    pub fn disconnect(&self) {
        *self.connected.lock().unwrap() = false;
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.lock().unwrap()
    }

    fn exhausted(&self) -> TransportError {
        if self.stall_when_empty {
            TransportError::Timeout { timeout_ms: 5000 }
        } else {
            TransportError::Closed
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl LampTransport for MockTransport {
    fn write(&mut self, data: &[u8]) -> Result<usize, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        self.write_log.lock().unwrap().push(data.to_vec());
        Ok(data.len())
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        let mut inbound = self.inbound.lock().unwrap();
        if inbound.len() < len {
            inbound.clear();
            return Err(self.exhausted());
        }
        Ok(inbound.drain(..len).collect())
    }

    fn read_line(&mut self) -> Result<Reply, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::Closed);
        }
        let mut inbound = self.inbound.lock().unwrap();
        if inbound.is_empty() {
            return Err(self.exhausted());
        }
        let end = inbound
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(inbound.len());
        Ok(Reply::from_line(inbound.drain(..end).collect()))
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.disconnect();
        Ok(())
    }

    fn peer(&self) -> String {
        "mock".to_string()
    }
}
