//! # Frame Packer
//!
//! Builds a frame from payload bytes written incrementally.
//!
//! A packer starts open with the start byte and a length placeholder in
//! place. [`FramePacker::end`] closes it: the length is back-patched, the
//! checksum and end byte are appended, and the frame becomes readable byte
//! by byte through [`FramePacker::available`] and [`FramePacker::read`].

use super::buffer::FrameBuffer;
use super::crc::Crc8;
use super::protocol::*;
use crate::diagnostics::{DumpRole, FrameDump};
use crate::error::{Result, WireError};

/// Incremental frame encoder
#[derive(Debug, Clone)]
pub struct FramePacker {
    buffer: FrameBuffer<FRAME_BUFFER_LENGTH>,
    open: bool,
}

impl Default for FramePacker {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePacker {
    /// Create an open, empty packer
    pub fn new() -> Self {
        let mut packer = Self {
            buffer: FrameBuffer::new(),
            open: true,
        };
        packer.reset();
        packer
    }

    /// Add one payload byte
    ///
    /// Rejected once [`FramePacker::end`] was called, or when the frame could
    /// no longer fit its checksum and end byte.
    ///
    /// # Returns
    ///
    /// * `bool` - `true` if the byte was added
    pub fn write_byte(&mut self, byte: u8) -> bool {
        if !self.open {
            return false;
        }

        // leave room for crc and end bytes
        if self.buffer.len() >= FRAME_BUFFER_LENGTH - 2 {
            return false;
        }

        self.buffer.push(byte)
    }

    /// Add payload bytes one at a time, stopping at the first rejection
    ///
    /// # Returns
    ///
    /// * `usize` - Number of bytes added, which may be less than `data.len()`
    pub fn write(&mut self, data: &[u8]) -> usize {
        data.iter().take_while(|&&byte| self.write_byte(byte)).count()
    }

    /// Close the packet
    ///
    /// Stores the final length in byte 1, appends the CRC8-MAXIM of
    /// `length ++ payload` and the end byte, and rewinds for reading.
    /// Calling it on a closed packer does nothing.
    pub fn end(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;

        // crc and end bytes always fit, write_byte keeps two slots free
        let total_length = (self.buffer.len() + 2) as u8;
        self.buffer.set(1, total_length);

        let mut crc8 = Crc8::new();
        crc8.calc(&[total_length]);
        let crc = crc8.update(&self.buffer.as_slice()[2..]);

        let closed = self.buffer.push(crc) && self.buffer.push(FRAME_END);
        debug_assert!(closed, "packer overflowed its reserved trailer slots");

        self.buffer.rewind();
    }

    /// Number of frame bytes left to read (0 while open)
    pub fn available(&self) -> usize {
        if self.open {
            return 0;
        }
        self.buffer.remaining()
    }

    /// Read the next frame byte
    ///
    /// # Returns
    ///
    /// * `Option<u8>` - `None` while open or once every byte was read
    pub fn read(&mut self) -> Option<u8> {
        if self.open {
            return None;
        }
        self.buffer.read()
    }

    /// Start over with an empty, open packet
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.buffer.push(FRAME_START);
        self.buffer.push(0);
        self.open = true;
    }

    /// Packet length so far
    ///
    /// While open this counts the crc and end bytes that [`FramePacker::end`]
    /// will append.
    pub fn packet_length(&self) -> usize {
        if self.open {
            return self.buffer.len() + 2;
        }
        self.buffer.len()
    }

    /// Payload bytes written so far
    pub fn payload_length(&self) -> usize {
        if self.open {
            self.buffer.len() - 2
        } else {
            self.buffer.len() - FRAME_OVERHEAD
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The complete frame, once closed
    pub fn frame(&self) -> Option<&[u8]> {
        if self.open {
            return None;
        }
        Some(self.buffer.as_slice())
    }

    /// Snapshot for a diagnostic sink
    pub fn dump(&self) -> FrameDump {
        FrameDump {
            role: DumpRole::Packer,
            open: self.open,
            total_length: self.buffer.len(),
            expected_length: None,
            error: None,
            bytes: self.buffer.as_slice().to_vec(),
        }
    }
}

/// Encode a payload into a complete frame
///
/// # Arguments
///
/// * `payload` - Up to [`MAX_PAYLOAD_LENGTH`] bytes
///
/// # Returns
///
/// * `Result<Vec<u8>>` - Complete frame (start + length + payload + crc + end)
///
/// # Errors
///
/// Returns [`WireError::PayloadTooLarge`] if the payload does not fit in one frame
///
/// # Examples
///
/// ```
/// use wirelink::frame::encoder::encode_frame;
///
/// let frame = encode_frame(b"hi")?;
/// assert_eq!(frame.len(), 6);
/// assert_eq!(frame[1], 6);
/// # Ok::<(), wirelink::error::WireError>(())
/// ```
pub fn encode_frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LENGTH {
        return Err(WireError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LENGTH,
        });
    }

    let mut packer = FramePacker::new();
    packer.write(payload);
    packer.end();

    Ok(packer.frame().map(<[u8]>::to_vec).unwrap_or_default())
}
