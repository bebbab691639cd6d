//! # Slave Module
//!
//! Responder side of an exchange. The owner calls [`Slave::update`] from its
//! own loop; each call drains whatever the requester wrote and either
//! delivers a payload to the handler or, for an empty trigger frame, asks
//! the handler for a response and stages it for the requester's next poll.

use tracing::{debug, trace, warn};

use crate::diagnostics::DiagnosticSink;
use crate::frame::buffer::FrameBuffer;
use crate::frame::decoder::FrameUnpacker;
use crate::frame::encoder::FramePacker;
use crate::frame::protocol::{DecodeError, FRAME_BUFFER_LENGTH};
use crate::transport::SlavePort;

/// Callbacks invoked from inside [`Slave::update`]
pub trait SlaveHandler {
    /// A frame with a verified payload arrived
    fn on_receive(&mut self, _payload: &[u8]) {}

    /// The requester sent a trigger; write the response into `response`
    ///
    /// The packer is open and empty; it is closed and sent after this returns.
    fn on_request(&mut self, _response: &mut FramePacker) {}
}

/// [`SlaveHandler`] built from two closures
pub struct FnHandler<R, Q> {
    on_receive: R,
    on_request: Q,
}

/// Build a handler from a receive closure and a request closure
pub fn handler_fn<R, Q>(on_receive: R, on_request: Q) -> FnHandler<R, Q>
where
    R: FnMut(&[u8]),
    Q: FnMut(&mut FramePacker),
{
    FnHandler {
        on_receive,
        on_request,
    }
}

impl<R, Q> SlaveHandler for FnHandler<R, Q>
where
    R: FnMut(&[u8]),
    Q: FnMut(&mut FramePacker),
{
    fn on_receive(&mut self, payload: &[u8]) {
        (self.on_receive)(payload)
    }

    fn on_request(&mut self, response: &mut FramePacker) {
        (self.on_request)(response)
    }
}

/// What a single [`Slave::update`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing arrived, or only bytes outside a frame
    Idle,
    /// Part of a frame arrived; waiting for the rest
    Pending,
    /// The frame was dropped
    Rejected(DecodeError),
    /// A payload of this many bytes was handed to `on_receive`
    Received(usize),
    /// A response frame of this many bytes was staged
    Responded(usize),
}

/// Frame-level responder bound to one port and one handler
pub struct Slave<P: SlavePort, H: SlaveHandler> {
    port: P,
    handler: H,
    packer: FramePacker,
    unpacker: FrameUnpacker,
    rx: FrameBuffer<FRAME_BUFFER_LENGTH>,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
}

impl<P: SlavePort, H: SlaveHandler> Slave<P, H> {
    pub fn new(port: P, handler: H) -> Self {
        Self {
            port,
            handler,
            packer: FramePacker::new(),
            unpacker: FrameUnpacker::new(),
            rx: FrameBuffer::new(),
            diagnostics: None,
        }
    }

    /// Dump the unpacker to `sink` whenever an incoming frame is rejected
    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Process whatever the requester sent since the last call
    pub fn update(&mut self) -> UpdateOutcome {
        let mut input = [0u8; FRAME_BUFFER_LENGTH];
        let len = self.port.read_buffer(&mut input);
        if len == 0 {
            return UpdateOutcome::Idle;
        }

        if !self.unpacker.is_packet_open() {
            self.unpacker.reset();
        }

        for &byte in &input[..len] {
            self.unpacker.write_byte(byte);
        }

        if self.unpacker.is_packet_open() {
            trace!("Partial frame, {} bytes so far", self.unpacker.total_length());
            return UpdateOutcome::Pending;
        }

        // bytes that never belonged to a frame
        if self.unpacker.total_length() == 0 {
            return UpdateOutcome::Idle;
        }

        if let Some(error) = self.unpacker.last_error() {
            warn!("Dropped incoming frame: {}", error);
            if let Some(sink) = self.diagnostics.as_mut() {
                sink.record("slave", &self.unpacker.dump());
            }
            return UpdateOutcome::Rejected(error);
        }

        if self.unpacker.available() > 0 {
            self.rx.clear();
            if let Some(payload) = self.unpacker.payload() {
                self.rx.extend(payload);
            }
            debug!("Received {} byte payload", self.rx.len());
            self.handler.on_receive(self.rx.as_slice());
            return UpdateOutcome::Received(self.rx.len());
        }

        self.respond()
    }

    /// Build the response for a trigger and stage it on the port
    fn respond(&mut self) -> UpdateOutcome {
        self.packer.reset();
        self.handler.on_request(&mut self.packer);
        self.packer.end();

        let frame = self.packer.frame().unwrap_or_default();
        self.port.reset_tx();
        let staged = self.port.write_buffer(frame);

        debug!(
            "Staged {} byte response ({} byte payload)",
            staged,
            self.packer.payload_length()
        );
        UpdateOutcome::Responded(staged)
    }

    /// Bytes of the last received payload not read yet
    pub fn available(&self) -> usize {
        self.rx.remaining()
    }

    /// Read the next byte of the last received payload
    pub fn read(&mut self) -> Option<u8> {
        self.rx.read()
    }

    /// Look at the next payload byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.rx.peek()
    }

    /// The last received payload
    pub fn payload(&self) -> &[u8] {
        self.rx.as_slice()
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }
}
