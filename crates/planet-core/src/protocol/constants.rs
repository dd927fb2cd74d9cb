//! Protocol constants for the Planet/WiFish download protocol.

// ============================================================================
// Framing
// ============================================================================

/// Start of text, opens every host -> device frame.
pub const STX: u8 = 0x02;

/// End of text, closes every host -> device frame.
pub const ETX: u8 = 0x03;

// ============================================================================
// Commands (Host -> Device)
// ============================================================================

/// Put the lamp in download mode.
pub const CMD_PROGRAM: &str = "PROGRAMPLANET01";

/// Announce the upload header.
pub const CMD_SEND_HEADER: &str = "SENDHEADER012000000";

/// Prefix of every packet command, followed by a 4-digit sequence number
/// and the 64 character payload.
pub const CMD_PACKET: &str = "PLANETPACKET01";

// ============================================================================
// Replies (Device -> Host)
// ============================================================================

/// Greeting sent by the bridge as soon as the connection opens.
pub const GREETING: &[u8; 7] = b"*HELLO*";

/// Download mode granted.
pub const REPLY_DOWNLOAD_MODE: &str = "PLANETGOINDWL01";

/// Frame accepted. Used for the header and for every packet.
pub const REPLY_PACKET_OK: &str = "PLANETPACKETOK01";

// ============================================================================
// Packets
// ============================================================================

/// Raw firmware bytes carried by one packet.
pub const PACKET_DATA_SIZE: usize = 32;

/// Encoded payload width (two hex digits per byte).
pub const PACKET_HEX_LEN: usize = PACKET_DATA_SIZE * 2;

/// Filler appended to the last packet when it carries fewer than 32 bytes.
pub const PACKET_PADDING: char = 'U';

/// Width of the packet sequence field.
pub const SEQUENCE_DIGITS: usize = 4;

/// Highest sequence number the 4-digit field can carry.
pub const MAX_SEQUENCE: usize = 9999;

/// Payload of the terminator packet, sent after the last firmware packet.
pub const UPLOAD_COMPLETED_SIGNATURE: &[u8; 32] = b"0123456789012345678901234EQUADRO";
