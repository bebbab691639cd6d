//! # Frame Unpacker
//!
//! Byte-at-a-time frame decoder. Bytes may arrive in chunks of any size;
//! each one advances a small state machine:
//!
//! ```text
//! Idle --start--> Length --len--> Payload --...--> Closed
//!   ^                                                 |
//!   +-------------------- reset() --------------------+
//! ```
//!
//! Anything before the start byte is ignored. The payload only becomes
//! readable once the end byte and the checksum were both verified.

use super::buffer::FrameBuffer;
use super::crc::Crc8;
use super::protocol::*;
use crate::diagnostics::{DumpRole, FrameDump};
use crate::error::{Result, WireError};

/// Unpacker progress through one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackState {
    /// No start byte seen yet
    Idle,
    /// Start byte seen, waiting for the length byte
    Length,
    /// Collecting payload and crc bytes
    Payload,
    /// End position reached, with or without an error
    Closed,
}

/// Incremental frame decoder
#[derive(Debug, Clone)]
pub struct FrameUnpacker {
    /// Payload followed by the received crc
    buffer: FrameBuffer<FRAME_BUFFER_LENGTH>,
    state: UnpackState,
    total_length: usize,
    expected_length: usize,
    last_error: Option<DecodeError>,
}

impl Default for FrameUnpacker {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameUnpacker {
    /// Create an idle unpacker
    pub fn new() -> Self {
        Self {
            buffer: FrameBuffer::new(),
            state: UnpackState::Idle,
            total_length: 0,
            expected_length: 0,
            last_error: None,
        }
    }

    /// Collect one frame byte
    ///
    /// # Returns
    ///
    /// * `bool` - `false` if the byte was ignored (no start byte yet, frame
    ///   already closed) or caused an error; check [`FrameUnpacker::last_error`]
    pub fn write_byte(&mut self, byte: u8) -> bool {
        if self.total_length >= FRAME_BUFFER_LENGTH || self.last_error.is_some() {
            return false;
        }

        match self.state {
            UnpackState::Idle => {
                if self.total_length == 0 && byte == FRAME_START {
                    self.state = UnpackState::Length;
                    self.total_length = 1;
                    return true;
                }
                false
            }
            UnpackState::Length => {
                let expected = byte as usize;
                if !(FRAME_OVERHEAD..=FRAME_BUFFER_LENGTH).contains(&expected) {
                    self.fail(DecodeError::InvalidLength);
                    return false;
                }

                self.expected_length = expected;
                self.total_length += 1;
                self.state = UnpackState::Payload;
                true
            }
            UnpackState::Payload if self.total_length < self.expected_length - 1 => {
                self.buffer.push(byte);
                self.total_length += 1;
                true
            }
            UnpackState::Payload => self.finish(byte),
            UnpackState::Closed => false,
        }
    }

    /// Collect bytes one at a time, stopping at the first rejected byte
    ///
    /// # Returns
    ///
    /// * `usize` - Number of bytes accepted
    pub fn write(&mut self, data: &[u8]) -> usize {
        data.iter().take_while(|&&byte| self.write_byte(byte)).count()
    }

    /// Handle the byte at the end position
    fn finish(&mut self, byte: u8) -> bool {
        self.state = UnpackState::Closed;
        self.total_length += 1;

        if byte != FRAME_END {
            self.last_error = Some(DecodeError::InvalidLength);
            return false;
        }

        let payload_length = self.total_length - FRAME_OVERHEAD;
        let received_crc = self.buffer.get(payload_length);

        let mut crc8 = Crc8::new();
        crc8.calc(&[self.expected_length as u8]);
        let crc = crc8.update(&self.buffer.as_slice()[..payload_length]);

        if received_crc != Some(crc) {
            self.last_error = Some(DecodeError::InvalidChecksum);
            return false;
        }

        // keep only the verified payload readable
        self.buffer.truncate(payload_length);
        self.buffer.rewind();
        true
    }

    fn fail(&mut self, error: DecodeError) {
        self.state = UnpackState::Closed;
        self.last_error = Some(error);
    }

    /// Number of payload bytes left to read
    ///
    /// Zero unless a complete, valid frame was collected.
    pub fn available(&self) -> usize {
        if !self.is_complete() {
            return 0;
        }
        self.buffer.remaining()
    }

    /// Read the next payload byte
    ///
    /// # Returns
    ///
    /// * `Option<u8>` - `None` if no verified payload is left
    pub fn read(&mut self) -> Option<u8> {
        if !self.is_complete() {
            return None;
        }
        self.buffer.read()
    }

    /// The verified payload, once a frame was collected without errors
    pub fn payload(&self) -> Option<&[u8]> {
        if !self.is_complete() {
            return None;
        }
        Some(self.buffer.as_slice())
    }

    /// Discard the current frame and wait for a new start byte
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = UnpackState::Idle;
        self.total_length = 0;
        self.expected_length = 0;
        self.last_error = None;
    }

    /// `true` if the frame closed without errors
    pub fn is_complete(&self) -> bool {
        self.state == UnpackState::Closed && self.last_error.is_none()
    }

    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }

    pub fn last_error(&self) -> Option<DecodeError> {
        self.last_error
    }

    /// `true` if a start byte was read and more frame bytes are expected
    pub fn is_packet_open(&self) -> bool {
        matches!(self.state, UnpackState::Length | UnpackState::Payload)
    }

    pub fn state(&self) -> UnpackState {
        self.state
    }

    /// Number of frame bytes consumed so far, start byte included
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Length announced by the frame, if the length byte was read
    pub fn expected_length(&self) -> Option<usize> {
        (self.expected_length != 0).then_some(self.expected_length)
    }

    /// Snapshot for a diagnostic sink
    pub fn dump(&self) -> FrameDump {
        FrameDump {
            role: DumpRole::Unpacker,
            open: self.is_packet_open(),
            total_length: self.total_length,
            expected_length: self.expected_length(),
            error: self.last_error.map(|e| e.as_str().to_string()),
            bytes: self.buffer.as_slice().to_vec(),
        }
    }
}

/// Decode one complete frame
///
/// Leading bytes before the start byte are skipped.
///
/// # Arguments
///
/// * `frame` - Raw bytes holding one frame
///
/// # Returns
///
/// * `Result<Vec<u8>>` - The verified payload
///
/// # Errors
///
/// Returns error if:
/// - The length or end byte is wrong, or the checksum does not match
/// - The bytes end before the frame does
pub fn decode_frame(frame: &[u8]) -> Result<Vec<u8>> {
    let mut unpacker = FrameUnpacker::new();

    for &byte in frame {
        unpacker.write_byte(byte);
        if unpacker.state() == UnpackState::Closed {
            break;
        }
    }

    if let Some(error) = unpacker.last_error() {
        return Err(WireError::Decode(error));
    }

    match unpacker.payload() {
        Some(payload) => Ok(payload.to_vec()),
        None => Err(WireError::IncompleteFrame(unpacker.total_length())),
    }
}
