//! # Frame Protocol Constants and Types
//!
//! Core definitions shared by the packer and the unpacker.
//!
//! ```text
//! [0]     start    (0x02)
//! [1]     length   total frame length, start..end inclusive
//! [2..n]  payload  0..=124 bytes
//! [n+1]   crc      CRC8-MAXIM over length + payload
//! [n+2]   end      (0x04)
//! ```

use thiserror::Error;

/// Frame start sentinel
pub const FRAME_START: u8 = 0x02;

/// Frame end sentinel
pub const FRAME_END: u8 = 0x04;

/// Capacity of every frame buffer, and therefore the largest frame on the wire
pub const FRAME_BUFFER_LENGTH: usize = 128;

/// Bytes that are not payload: start + length + crc + end
pub const FRAME_OVERHEAD: usize = 4;

/// Largest payload a single frame can carry (128 - 4 = 124 bytes)
pub const MAX_PAYLOAD_LENGTH: usize = FRAME_BUFFER_LENGTH - FRAME_OVERHEAD;

/// Reasons the unpacker gives up on a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeError {
    /// Declared length out of range, or the byte at the end position is not
    /// the end sentinel
    #[error("invalid length")]
    InvalidLength,

    /// Checksum over length + payload does not match the received one
    #[error("invalid crc")]
    InvalidChecksum,
}

impl DecodeError {
    /// Short lowercase name, used in diagnostic dumps
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeError::InvalidLength => "invalid length",
            DecodeError::InvalidChecksum => "invalid crc",
        }
    }
}

/// Total frame length for a payload of `payload_len` bytes
pub const fn frame_length(payload_len: usize) -> usize {
    payload_len + FRAME_OVERHEAD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_are_distinct() {
        assert_eq!(FRAME_START, 0x02);
        assert_eq!(FRAME_END, 0x04);
        assert_ne!(FRAME_START, FRAME_END);
    }

    #[test]
    fn test_size_constants() {
        assert_eq!(FRAME_BUFFER_LENGTH, 128);
        assert_eq!(FRAME_OVERHEAD, 4);
        assert_eq!(MAX_PAYLOAD_LENGTH, 124);
        assert_eq!(frame_length(MAX_PAYLOAD_LENGTH), FRAME_BUFFER_LENGTH);
        assert_eq!(frame_length(0), 4);
    }

    #[test]
    fn test_length_byte_can_hold_largest_frame() {
        assert!(FRAME_BUFFER_LENGTH <= u8::MAX as usize);
    }

    #[test]
    fn test_decode_error_display() {
        assert_eq!(DecodeError::InvalidLength.to_string(), "invalid length");
        assert_eq!(DecodeError::InvalidChecksum.to_string(), "invalid crc");
        assert_eq!(DecodeError::InvalidChecksum.as_str(), "invalid crc");
    }
}
