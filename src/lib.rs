//! # Wirelink Library
//!
//! Reliable framed packets over polled byte buses such as I2C.
//!
//! This library provides CRC-8/MAXIM checksummed framing, a byte-at-a-time
//! frame unpacker, and a requester that triggers a responder, polls it with
//! linear backoff and retries on corrupt or incomplete frames.

pub mod config;
pub mod error;
pub mod frame;
pub mod diagnostics;
pub mod transport;
pub mod request;
pub mod slave;
