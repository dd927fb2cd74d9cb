//! Device -> host replies.
//!
//! The lamp answers with fixed ASCII literals; a reply is accepted only on an
//! exact byte match.

use std::fmt;

/// Raw reply received from the lamp, line terminator already stripped.
#[derive(Clone, PartialEq, Eq)]
pub struct Reply {
    bytes: Vec<u8>,
}

impl Reply {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Build a reply from a line read off the wire, dropping `\n` or `\r\n`.
    pub fn from_line(mut line: Vec<u8>) -> Self {
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        Self { bytes: line }
    }

    /// Printable form, non-printable bytes replaced with '.'.
    pub fn as_ascii(&self) -> String {
        self.bytes
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Exact match against an expected literal.
    pub fn matches(&self, expected: &[u8]) -> bool {
        self.bytes == expected
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reply({} bytes '{}')", self.bytes.len(), self.as_ascii())
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_ascii())
    }
}
