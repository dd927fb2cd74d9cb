//! Payload handling module.
//!
//! Provides firmware images and their packet encoding.

pub mod firmware;
pub mod packet;

pub use firmware::{FirmwareError, FirmwareImage, LampType};
pub use packet::{PacketIterator, completion_packet, packet_count, packetize};
