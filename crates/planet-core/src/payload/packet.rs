//! Firmware packetization.
//!
//! The image is cut into 32 byte chunks, each sent as 64 uppercase hex
//! digits. A short final chunk is right-padded with 'U' to keep every
//! payload the same width.

use crate::protocol::constants::{
    PACKET_DATA_SIZE, PACKET_HEX_LEN, PACKET_PADDING, UPLOAD_COMPLETED_SIGNATURE,
};

/// Encode a whole image into its ordered packet payloads.
pub fn packetize(firmware: &[u8]) -> Vec<String> {
    PacketIterator::new(firmware).collect()
}

/// Payload of the terminator packet.
pub fn completion_packet() -> String {
    hex::encode_upper(UPLOAD_COMPLETED_SIGNATURE)
}

/// Number of packets an image of `len` bytes produces.
pub fn packet_count(len: usize) -> usize {
    len.div_ceil(PACKET_DATA_SIZE)
}

fn encode_chunk(chunk: &[u8]) -> String {
    let mut encoded = hex::encode_upper(chunk);
    while encoded.len() < PACKET_HEX_LEN {
        encoded.push(PACKET_PADDING);
    }
    encoded
}

/// Lazy iterator over encoded packets.
#[derive(Debug, Clone)]
pub struct PacketIterator<'a> {
    data: &'a [u8],
    offset: usize,
    current: usize,
}

impl<'a> PacketIterator<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            current: 0,
        }
    }

    /// Total number of packets, including a padded one.
    pub fn total(&self) -> usize {
        packet_count(self.data.len())
    }

}

impl Iterator for PacketIterator<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let end = (self.offset + PACKET_DATA_SIZE).min(self.data.len());
        let packet = encode_chunk(&self.data[self.offset..end]);
        self.offset = end;
        self.current += 1;

        Some(packet)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PacketIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_image_has_no_packets() {
        assert!(packetize(&[]).is_empty());
        assert_eq!(PacketIterator::new(&[]).total(), 0);
    }

    #[test]
    fn test_packet_count_is_ceiling() {
        for (len, expected) in [(1, 1), (31, 1), (32, 1), (33, 2), (64, 2), (65, 3), (1000, 32)] {
            let data = vec![0u8; len];
            assert_eq!(packetize(&data).len(), expected, "len {len}");
            assert_eq!(packet_count(len), expected);
        }
    }

    #[test]
    fn test_aligned_image_is_not_padded() {
        let data: Vec<u8> = (0..96u8).collect();
        let packets = packetize(&data);
        assert_eq!(packets.len(), 3);
        for packet in &packets {
            assert_eq!(packet.len(), PACKET_HEX_LEN);
            assert!(!packet.contains(PACKET_PADDING));
        }
        assert_eq!(&packets[0][..8], "00010203");
    }

    #[test]
    fn test_final_packet_padding() {
        for remainder in 1..PACKET_DATA_SIZE {
            let data = vec![0xABu8; PACKET_DATA_SIZE + remainder];
            let packets = packetize(&data);
            let last = packets.last().unwrap();
            assert_eq!(last.len(), PACKET_HEX_LEN);
            assert_eq!(&last[..2 * remainder], "AB".repeat(remainder));
            assert_eq!(
                &last[2 * remainder..],
                "U".repeat(PACKET_HEX_LEN - 2 * remainder)
            );
        }
    }

    #[test]
    fn test_forty_bytes_of_a() {
        let packets = packetize(&[0x41; 40]);
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0], "41".repeat(32));
        assert_eq!(packets[1], format!("{}{}", "41".repeat(8), "U".repeat(48)));
    }

    #[test]
    fn test_uppercase_and_deterministic() {
        let data: Vec<u8> = (0..=255u8).collect();
        let first = packetize(&data);
        assert_eq!(first, packetize(&data));
        assert!(
            first
                .concat()
                .chars()
                .all(|c| matches!(c, '0'..='9' | 'A'..='F'))
        );
        assert_eq!(&first[5][..8], "A0A1A2A3");
        assert_eq!(&first[7][48..], "F8F9FAFBFCFDFEFF");
    }

    #[test]
    fn test_iterator_progress() {
        let data = vec![1u8; 70];
        let mut iter = PacketIterator::new(&data);
        assert_eq!(iter.total(), 3);
        assert_eq!(iter.len(), 3);
        iter.next();
        iter.next();
        assert_eq!(iter.len(), 1);
        assert!(iter.next().is_some());
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_completion_packet() {
        let packet = completion_packet();
        assert_eq!(packet.len(), PACKET_HEX_LEN);
        assert_eq!(
            packet,
            "303132333435363738393031323334353637383930313233344551554144524F"
        );
    }
}
