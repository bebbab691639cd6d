//! # Bounded Frame Buffer
//!
//! Fixed-capacity byte store shared by the packer, the unpacker and the
//! requester/responder receive buffers. Appends are capacity-checked and
//! reads consume sequentially through an internal cursor, so callers never
//! juggle raw indices.

use heapless::Vec;

/// Fixed-capacity byte buffer with a sequential read cursor
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer<const N: usize> {
    data: Vec<u8, N>,
    cursor: usize,
}

impl<const N: usize> FrameBuffer<N> {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            cursor: 0,
        }
    }

    /// Maximum number of bytes the buffer can hold
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes stored
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.data.len() >= N
    }

    /// Append one byte
    ///
    /// # Returns
    ///
    /// * `bool` - `false` if the buffer is full (nothing is changed)
    pub fn push(&mut self, byte: u8) -> bool {
        self.data.push(byte).is_ok()
    }

    /// Append bytes until the buffer is full
    ///
    /// # Returns
    ///
    /// * `usize` - Number of bytes actually appended (short write)
    pub fn extend(&mut self, bytes: &[u8]) -> usize {
        let mut written = 0;
        for &byte in bytes {
            if !self.push(byte) {
                break;
            }
            written += 1;
        }
        written
    }

    /// Overwrite an already stored byte
    ///
    /// Returns `false` if `index` is past the stored length.
    pub fn set(&mut self, index: usize, byte: u8) -> bool {
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = byte;
                true
            }
            None => false,
        }
    }

    /// Byte at `index`, if stored
    pub fn get(&self, index: usize) -> Option<u8> {
        self.data.get(index).copied()
    }

    /// Drop everything from `len` onwards
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
        self.cursor = self.cursor.min(self.data.len());
    }

    /// Consume the next unread byte
    pub fn read(&mut self) -> Option<u8> {
        let byte = self.data.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(byte)
    }

    /// Look at the next unread byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.cursor).copied()
    }

    /// Bytes stored but not read yet
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Move the read cursor back to the first byte
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Remove all bytes and reset the cursor
    pub fn clear(&mut self) {
        self.data.clear();
        self.cursor = 0;
    }

    /// All stored bytes, regardless of the cursor
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Bytes not read yet
    pub fn unread(&self) -> &[u8] {
        &self.data[self.cursor..]
    }
}
