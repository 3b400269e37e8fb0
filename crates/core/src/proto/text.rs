use displaydoc::Display;

use super::{Packet, PACKET_LEN};

/// Reasons a log line cannot be decoded into a packet.
#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// `{0}` is not a hexadecimal byte.
    BadToken(String),
    /// expected 32 bytes, got {0}.
    WrongLength(usize),
    /// the line is not valid UTF-8.
    NotUtf8,
}

impl std::error::Error for FrameError {}

/// Renders a packet as a newline terminated log line.
pub fn format_for_log(packet: &Packet) -> String {
    let mut line = packet.to_string();
    line.push('\n');
    line
}

/// Decodes a log line produced by [`format_for_log`].
///
/// Tokens are parsed as base-16 integers and clamped into the byte range. The whole line
/// is rejected on the first non hexadecimal token.
pub fn parse_log_line(line: &str) -> Result<Packet, FrameError> {
    let mut bytes = [0_u8; PACKET_LEN];
    let mut len = 0;

    for token in line.split_whitespace() {
        let byte = parse_hex_byte(token)?;
        if len < PACKET_LEN {
            bytes[len] = byte;
        }
        len += 1;
    }

    if len != PACKET_LEN {
        return Err(FrameError::WrongLength(len));
    }
    Ok(Packet::from_bytes(bytes))
}

fn parse_hex_byte(token: &str) -> Result<u8, FrameError> {
    use core::num::IntErrorKind;

    match i64::from_str_radix(token, 16) {
        Ok(value) => Ok(value.clamp(0, i64::from(u8::MAX)) as u8),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Ok(u8::MAX),
            IntErrorKind::NegOverflow => Ok(0),
            _ => Err(FrameError::BadToken(token.to_owned())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::CHANNELS_COUNT;

    fn sample_packet() -> Packet {
        let mut intensities = [0_u8; CHANNELS_COUNT];
        for (i, byte) in intensities.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(37);
        }
        Packet::encode(&intensities)
    }

    #[test]
    fn test_format_for_log() {
        let line = format_for_log(&Packet::encode(&[0xAB; CHANNELS_COUNT]));
        assert!(line.starts_with("DA AD AB "));
        assert!(line.ends_with("AB\n"));
        assert_eq!(line.len(), PACKET_LEN * 3);
    }

    #[test]
    fn test_log_line_round_trip() {
        let packet = sample_packet();
        assert_eq!(parse_log_line(&format_for_log(&packet)), Ok(packet));

        let zeroes = Packet::encode(&[0; CHANNELS_COUNT]);
        assert_eq!(parse_log_line(&format_for_log(&zeroes)), Ok(zeroes));
    }

    #[test]
    fn test_parse_lowercase_and_extra_whitespace() {
        let packet = sample_packet();
        let line = format_for_log(&packet).to_lowercase().replace(' ', "\t  ");
        assert_eq!(parse_log_line(&line), Ok(packet));
    }

    #[test]
    fn test_parse_clamps_out_of_range() {
        let mut line = String::from("DA AD 1FF");
        for _ in 1..CHANNELS_COUNT {
            line.push_str(" 00");
        }

        let packet = parse_log_line(&line).unwrap();
        assert_eq!(packet.as_bytes()[2], 0xFF);

        let line = line.replacen("1FF", "FFFFFFFFFFFFFFFFFFFFFFFF", 1);
        let packet = parse_log_line(&line).unwrap();
        assert_eq!(packet.as_bytes()[2], 0xFF);
    }

    #[test]
    fn test_parse_rejects_invalid_lines() {
        assert_eq!(parse_log_line(""), Err(FrameError::WrongLength(0)));
        assert_eq!(parse_log_line("DA AD 01"), Err(FrameError::WrongLength(3)));

        let mut too_long = format_for_log(&sample_packet());
        too_long.insert_str(0, "00 ");
        assert_eq!(parse_log_line(&too_long), Err(FrameError::WrongLength(33)));

        let bad = format_for_log(&sample_packet()).replacen("AD", "ZZ", 1);
        assert_eq!(
            parse_log_line(&bad),
            Err(FrameError::BadToken("ZZ".to_owned()))
        );
    }
}
