//! Wire packet framing.

use core::fmt::Display;

pub use self::text::{format_for_log, parse_log_line, FrameError};
use crate::bank::CHANNELS_COUNT;

mod text;

/// Magic bytes which start every packet.
pub const PACKET_MAGIC: [u8; 2] = [0xDA, 0xAD];
/// Total packet length: magic header followed by one byte per channel.
pub const PACKET_LEN: usize = PACKET_MAGIC.len() + CHANNELS_COUNT;

/// Channel intensities in the bank order.
pub type Intensities = [u8; CHANNELS_COUNT];

/// A fixed size packet sent to the device.
///
/// There is no checksum, acknowledgment or length prefix, the device expects exactly
/// [`PACKET_LEN`] bytes.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct Packet([u8; PACKET_LEN]);

impl Packet {
    /// Frames the given intensities.
    pub fn encode(intensities: &Intensities) -> Self {
        let mut bytes = [0_u8; PACKET_LEN];
        bytes[..PACKET_MAGIC.len()].copy_from_slice(&PACKET_MAGIC);
        bytes[PACKET_MAGIC.len()..].copy_from_slice(intensities);
        Self(bytes)
    }

    /// Wraps raw bytes as is, the header is not validated.
    pub const fn from_bytes(bytes: [u8; PACKET_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PACKET_LEN] {
        &self.0
    }

    /// Returns the payload part of the packet.
    pub fn intensities(&self) -> Intensities {
        let mut intensities = [0_u8; CHANNELS_COUNT];
        intensities.copy_from_slice(&self.0[PACKET_MAGIC.len()..]);
        intensities
    }

    /// Returns true if the packet starts with [`PACKET_MAGIC`].
    pub fn has_magic(&self) -> bool {
        self.0[..PACKET_MAGIC.len()] == PACKET_MAGIC
    }
}

impl AsRef<[u8]> for Packet {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Formats the packet as space separated uppercase hex bytes.
impl Display for Packet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header_and_payload() {
        let mut intensities = [0_u8; CHANNELS_COUNT];
        for (i, byte) in intensities.iter_mut().enumerate() {
            *byte = i as u8 * 8;
        }

        let packet = Packet::encode(&intensities);
        assert_eq!(packet.as_bytes().len(), 32);
        assert_eq!(packet.as_bytes()[..2], [0xDA, 0xAD]);
        assert!(packet.has_magic());
        assert_eq!(packet.intensities(), intensities);
        // Encoding is deterministic.
        assert_eq!(packet, Packet::encode(&intensities));
    }

    #[test]
    fn test_display() {
        let packet = Packet::encode(&[0x0F; CHANNELS_COUNT]);
        let text = packet.to_string();
        assert!(text.starts_with("DA AD 0F 0F"));
        assert!(text.ends_with("0F"));
        assert_eq!(text.split(' ').count(), PACKET_LEN);
    }
}
