//! Host -> device frames.
//!
//! Every command is wrapped in an STX/ETX envelope with no length field
//! and no checksum.

use std::fmt;

use super::constants::{CMD_PACKET, CMD_PROGRAM, CMD_SEND_HEADER, ETX, SEQUENCE_DIGITS, STX};

/// A command frame sent to the lamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<'a> {
    /// `PROGRAMPLANET01` - request download mode.
    Program,
    /// `SENDHEADER012000000` - announce the upload header.
    SendHeader,
    /// `PLANETPACKET01` followed by the sequence number and the encoded payload.
    Packet { seq: usize, payload: &'a str },
}

impl Frame<'_> {
    /// Command text without the envelope.
    pub fn command(&self) -> String {
        match self {
            Frame::Program => CMD_PROGRAM.to_string(),
            Frame::SendHeader => CMD_SEND_HEADER.to_string(),
            Frame::Packet { seq, payload } => {
                format!("{CMD_PACKET}{seq:0width$}{payload}", width = SEQUENCE_DIGITS)
            }
        }
    }

    /// Serialize the frame, envelope included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let command = self.command();
        let mut buf = Vec::with_capacity(command.len() + 2);
        buf.push(STX);
        buf.extend_from_slice(command.as_bytes());
        buf.push(ETX);
        buf
    }
}

impl fmt::Display for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Program => write!(f, "PROGRAM"),
            Frame::SendHeader => write!(f, "SENDHEADER"),
            Frame::Packet { seq, .. } => write!(f, "PACKET #{seq:04}"),
        }
    }
}
