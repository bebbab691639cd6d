//! # Transport Module
//!
//! Boundary between the framing protocol and the bus that carries it.
//!
//! This module handles:
//! - The requester-side capability: addressed framed writes and polled reads
//! - The responder-side capability: draining received bytes, staging replies
//! - Abstracting the blocking backoff wait
//! - An in-process bus joining both sides for tests and the demo binary

use std::time::Duration;

use crate::error::Result;

pub mod memory;

pub use memory::{MemoryBus, MemoryMaster, MemorySlave};

/// Requester side of a polled byte bus (I2C master style)
///
/// Outbound data is sent as `begin_transmission`, any number of `write`
/// calls, then `end_transmission`. Inbound data is fetched with
/// `request_from` and then drained with `available`/`read`.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Start an outbound transmission to `address`
    fn begin_transmission(&mut self, address: u8);

    /// Queue one byte of the current transmission
    ///
    /// # Returns
    ///
    /// * `usize` - 1 if the byte was queued
    fn write(&mut self, byte: u8) -> usize;

    /// Send the queued bytes
    fn end_transmission(&mut self) -> Result<()>;

    /// Poll `address` for up to `len` bytes
    ///
    /// # Returns
    ///
    /// * `usize` - Number of bytes received; 0 means nobody answered
    fn request_from(&mut self, address: u8, len: usize) -> usize;

    /// Bytes received by the last poll and not read yet
    fn available(&self) -> usize;

    /// Read the next received byte
    fn read(&mut self) -> Option<u8>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn begin_transmission(&mut self, address: u8) {
        (**self).begin_transmission(address)
    }

    fn write(&mut self, byte: u8) -> usize {
        (**self).write(byte)
    }

    fn end_transmission(&mut self) -> Result<()> {
        (**self).end_transmission()
    }

    fn request_from(&mut self, address: u8, len: usize) -> usize {
        (**self).request_from(address, len)
    }

    fn available(&self) -> usize {
        (**self).available()
    }

    fn read(&mut self) -> Option<u8> {
        (**self).read()
    }
}

/// Responder side of a polled byte bus (I2C slave style)
pub trait SlavePort {
    /// Move bytes written by the requester into `buf`, without blocking
    ///
    /// # Returns
    ///
    /// * `usize` - Number of bytes copied
    fn read_buffer(&mut self, buf: &mut [u8]) -> usize;

    /// Drop outbound bytes the requester has not polled yet
    fn reset_tx(&mut self);

    /// Stage bytes for the requester's next poll
    ///
    /// # Returns
    ///
    /// * `usize` - Number of bytes staged
    fn write_buffer(&mut self, data: &[u8]) -> usize;
}

impl<P: SlavePort + ?Sized> SlavePort for &mut P {
    fn read_buffer(&mut self, buf: &mut [u8]) -> usize {
        (**self).read_buffer(buf)
    }

    fn reset_tx(&mut self) {
        (**self).reset_tx()
    }

    fn write_buffer(&mut self, data: &[u8]) -> usize {
        (**self).write_buffer(data)
    }
}

/// Blocking wait between request attempts
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

impl<D: Delay + ?Sized> Delay for &mut D {
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration)
    }
}

/// [`Delay`] backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
