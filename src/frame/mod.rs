//! # Frame Module
//!
//! Checksummed packet framing for byte-oriented transports.
//!
//! This module handles:
//! - CRC-8/MAXIM checksum calculation
//! - Packing payloads into `[START][LEN][payload][CRC][END]` frames
//! - Unpacking frames one byte at a time with length and checksum validation

pub mod protocol;
pub mod crc;
pub mod buffer;
pub mod encoder;
pub mod decoder;
