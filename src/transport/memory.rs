//! In-process bus joining one requester to one responder.
//!
//! Polls behave like an I2C master read: the addressed device always clocks
//! out the requested number of bytes, padding with `0xFF` once its staged
//! response runs out. Polling any other address returns nothing.

use bytes::{Buf, BufMut, BytesMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

use super::{SlavePort, Transport};
use crate::error::{Result, WireError};

/// Byte clocked out when the responder has nothing staged
pub const IDLE_BYTE: u8 = 0xFF;

#[derive(Debug, Default)]
struct BusState {
    address: u8,
    /// requester -> responder
    rx: BytesMut,
    /// responder -> requester
    tx: BytesMut,
    corrupt_every: u32,
    transmissions: u64,
    polls: u64,
    corrupted: u64,
}

/// Counters kept by a [`MemoryBus`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusStats {
    pub transmissions: u64,
    pub polls: u64,
    pub corrupted: u64,
}

/// Shared in-memory bus with a single responder
#[derive(Debug, Clone)]
pub struct MemoryBus {
    state: Arc<Mutex<BusState>>,
}

impl MemoryBus {
    /// Create a bus whose responder answers at `address`
    pub fn new(address: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                address,
                ..BusState::default()
            })),
        }
    }

    /// Flip one bit in every `n`-th poll (0 disables)
    pub fn set_corrupt_every(&self, n: u32) {
        lock(&self.state).corrupt_every = n;
    }

    /// Requester-side handle
    pub fn master(&self) -> MemoryMaster {
        MemoryMaster {
            state: Arc::clone(&self.state),
            pending: None,
            inbox: BytesMut::new(),
        }
    }

    /// Responder-side handle
    pub fn slave(&self) -> MemorySlave {
        MemorySlave {
            state: Arc::clone(&self.state),
        }
    }

    pub fn stats(&self) -> BusStats {
        let state = lock(&self.state);
        BusStats {
            transmissions: state.transmissions,
            polls: state.polls,
            corrupted: state.corrupted,
        }
    }
}

fn lock(state: &Mutex<BusState>) -> MutexGuard<'_, BusState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Requester end of a [`MemoryBus`]
#[derive(Debug)]
pub struct MemoryMaster {
    state: Arc<Mutex<BusState>>,
    pending: Option<(u8, BytesMut)>,
    inbox: BytesMut,
}

impl Transport for MemoryMaster {
    fn begin_transmission(&mut self, address: u8) {
        self.pending = Some((address, BytesMut::new()));
    }

    fn write(&mut self, byte: u8) -> usize {
        match self.pending.as_mut() {
            Some((_, bytes)) => {
                bytes.put_u8(byte);
                1
            }
            None => 0,
        }
    }

    fn end_transmission(&mut self) -> Result<()> {
        let (address, bytes) = self
            .pending
            .take()
            .ok_or_else(|| WireError::Transport("no transmission in progress".to_string()))?;

        let mut state = lock(&self.state);
        if address != state.address {
            return Err(WireError::Transport(format!(
                "no device acknowledged address 0x{:02X}",
                address
            )));
        }

        state.rx.extend_from_slice(&bytes);
        state.transmissions += 1;
        trace!("Delivered {} bytes to 0x{:02X}", bytes.len(), address);
        Ok(())
    }

    fn request_from(&mut self, address: u8, len: usize) -> usize {
        self.inbox.clear();

        let mut state = lock(&self.state);
        if address != state.address || len == 0 {
            return 0;
        }

        let staged = len.min(state.tx.len());
        let response = state.tx.split_to(staged);
        self.inbox.extend_from_slice(&response);
        self.inbox.resize(len, IDLE_BYTE);

        state.polls += 1;
        if state.corrupt_every > 0 && state.polls % u64::from(state.corrupt_every) == 0 {
            // lands on the first payload byte, or the crc of an empty frame
            let index = 2.min(len - 1);
            self.inbox[index] ^= 0x01;
            state.corrupted += 1;
        }

        len
    }

    fn available(&self) -> usize {
        self.inbox.len()
    }

    fn read(&mut self) -> Option<u8> {
        if !self.inbox.has_remaining() {
            return None;
        }
        Some(self.inbox.get_u8())
    }
}

/// Responder end of a [`MemoryBus`]
#[derive(Debug, Clone)]
pub struct MemorySlave {
    state: Arc<Mutex<BusState>>,
}

impl SlavePort for MemorySlave {
    fn read_buffer(&mut self, buf: &mut [u8]) -> usize {
        let mut state = lock(&self.state);
        let count = buf.len().min(state.rx.len());
        buf[..count].copy_from_slice(&state.rx.split_to(count));
        count
    }

    fn reset_tx(&mut self) {
        lock(&self.state).tx.clear();
    }

    fn write_buffer(&mut self, data: &[u8]) -> usize {
        lock(&self.state).tx.extend_from_slice(data);
        data.len()
    }
}
