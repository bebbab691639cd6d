//! # Request Module
//!
//! Requester side of an exchange: asks a responder for a fresh frame and
//! keeps polling until a valid one arrives or the attempt budget runs out.
//!
//! One request goes like this:
//! 1. Send an empty trigger frame so the responder refreshes its output.
//! 2. Wait `retry_delay * attempt` (linear backoff).
//! 3. Poll for up to `response_length + 4` bytes and feed them to an unpacker.
//! 4. Valid frame: done. Decode error: reset and trigger again. Partial
//!    frame: poll again without a new trigger.
//!
//! A poll that returns no bytes at all ends the request immediately.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::RequestConfig;
use crate::diagnostics::DiagnosticSink;
use crate::frame::buffer::FrameBuffer;
use crate::frame::decoder::FrameUnpacker;
use crate::frame::encoder::FramePacker;
use crate::frame::protocol::{DecodeError, FRAME_BUFFER_LENGTH, FRAME_OVERHEAD};
use crate::transport::{Delay, Transport};

/// Default wait between attempts (grows linearly with each attempt)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Default number of polls before giving up
pub const DEFAULT_MAX_ATTEMPTS: u8 = 5;

/// Outcome of the last request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    /// No request made yet
    #[default]
    None,
    /// A valid frame was read; its payload is available
    PacketRead,
    /// The poll returned no bytes
    PeerNotFound,
    /// The attempts ran out and the last one ended with a decode error
    PacketError,
    /// The attempts ran out without a complete frame
    MaxAttempts,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::None => "none",
            RequestStatus::PacketRead => "packet read",
            RequestStatus::PeerNotFound => "peer not found",
            RequestStatus::PacketError => "packet error",
            RequestStatus::MaxAttempts => "max attempts",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("peer not found at 0x{0:02X}")]
    PeerNotFound(u8),

    #[error("packet error: {0}")]
    PacketError(DecodeError),

    #[error("max attempts ({0}) reached without a complete packet")]
    MaxAttempts(u8),
}

impl RequestError {
    /// Status recorded alongside this error
    pub fn status(&self) -> RequestStatus {
        match self {
            RequestError::PeerNotFound(_) => RequestStatus::PeerNotFound,
            RequestError::PacketError(_) => RequestStatus::PacketError,
            RequestError::MaxAttempts(_) => RequestStatus::MaxAttempts,
        }
    }
}

/// Reads framed responses from one responder, with retries
///
/// # Examples
///
/// ```no_run
/// use wirelink::request::SlaveRequest;
/// use wirelink::transport::{MemoryBus, StdDelay};
///
/// let bus = MemoryBus::new(0x08);
/// let mut master = bus.master();
///
/// let mut request = SlaveRequest::new(&mut master, StdDelay, 0x08, 16);
/// match request.request() {
///     Ok(len) => println!("got {} bytes: {:?}", len, request.payload()),
///     Err(e) => println!("request failed: {} ({})", e, request.last_status()),
/// }
/// ```
pub struct SlaveRequest<T: Transport, D: Delay> {
    transport: T,
    delay: D,
    address: u8,
    read_length: usize,
    retry_delay: Duration,
    max_attempts: u8,
    frame_timeout: Option<Duration>,
    last_status: RequestStatus,
    rx: FrameBuffer<FRAME_BUFFER_LENGTH>,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
}

impl<T: Transport, D: Delay> fmt::Debug for SlaveRequest<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlaveRequest")
            .field("address", &self.address)
            .field("read_length", &self.read_length)
            .field("retry_delay", &self.retry_delay)
            .field("max_attempts", &self.max_attempts)
            .field("last_status", &self.last_status)
            .finish_non_exhaustive()
    }
}

impl<T: Transport, D: Delay> SlaveRequest<T, D> {
    /// Create a request for `address`
    ///
    /// # Arguments
    ///
    /// * `transport` - Bus to poll (pass `&mut bus` to keep ownership)
    /// * `delay` - Blocking wait used for backoff
    /// * `address` - Responder address
    /// * `response_length` - Largest payload expected; polls read this plus
    ///   the 4 framing bytes, capped at one full frame
    pub fn new(transport: T, delay: D, address: u8, response_length: usize) -> Self {
        Self {
            transport,
            delay,
            address,
            read_length: response_length
                .saturating_add(FRAME_OVERHEAD)
                .min(FRAME_BUFFER_LENGTH),
            retry_delay: DEFAULT_RETRY_DELAY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            frame_timeout: None,
            last_status: RequestStatus::None,
            rx: FrameBuffer::new(),
            diagnostics: None,
        }
    }

    /// Create a request configured from a `[request]` section
    pub fn from_config(transport: T, delay: D, config: &RequestConfig) -> Self {
        let mut request = Self::new(transport, delay, config.address, config.response_length);
        request.set_retry_delay(Duration::from_millis(config.retry_delay_ms));
        request.set_attempts(config.max_attempts);
        request.set_frame_timeout(config.frame_timeout_ms.map(Duration::from_millis));
        request
    }

    /// Base wait between attempts; attempt `n` waits `n * retry_delay`
    pub fn set_retry_delay(&mut self, retry_delay: Duration) {
        self.retry_delay = retry_delay;
    }

    /// Number of polls before giving up
    pub fn set_attempts(&mut self, attempts: u8) {
        self.max_attempts = attempts;
    }

    pub fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    /// Give up on a partial frame after waiting this long for the rest
    ///
    /// The unpacker is then reset and the next attempt sends a new trigger.
    /// `None` keeps polling until the attempts run out.
    pub fn set_frame_timeout(&mut self, timeout: Option<Duration>) {
        self.frame_timeout = timeout;
    }

    /// Dump the unpacker to `sink` whenever a frame fails to decode
    pub fn with_diagnostics(mut self, sink: Box<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Bytes read per poll
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Request a frame from the responder
    ///
    /// # Returns
    ///
    /// * `Result<usize, RequestError>` - Payload length on success; the
    ///   payload is then readable through [`SlaveRequest::read`] or
    ///   [`SlaveRequest::payload`]
    ///
    /// # Errors
    ///
    /// - `PeerNotFound`: a poll returned no bytes (no retry)
    /// - `PacketError`: every attempt was used and the last frame was corrupt
    /// - `MaxAttempts`: every attempt was used without a complete frame
    pub fn request(&mut self) -> std::result::Result<usize, RequestError> {
        self.rx.clear();
        self.last_status = RequestStatus::None;

        let mut unpacker = FrameUnpacker::new();
        let mut attempts: u8 = 0;
        let mut send_trigger = true;
        let mut last_error: Option<DecodeError> = None;
        let mut open_wait = Duration::ZERO;
        let mut complete = false;

        while attempts < self.max_attempts {
            if send_trigger {
                self.trigger_update();
                send_trigger = false;
            }

            // wait until the responder fills its output buffer
            let wait = self.retry_delay.saturating_mul(u32::from(attempts) + 1);
            self.delay.delay(wait);

            let returned = self.transport.request_from(self.address, self.read_length);
            if returned == 0 {
                warn!("No response from 0x{:02X}", self.address);
                return self.fail(RequestError::PeerNotFound(self.address));
            }

            while self.transport.available() > 0 {
                match self.transport.read() {
                    Some(byte) => {
                        unpacker.write_byte(byte);
                    }
                    None => break,
                }
            }

            debug!(
                attempt = attempts + 1,
                returned,
                consumed = unpacker.total_length(),
                "Polled 0x{:02X}",
                self.address
            );

            if unpacker.is_complete() {
                complete = true;
                break;
            }

            if let Some(error) = unpacker.last_error() {
                warn!("Frame from 0x{:02X} rejected: {}", self.address, error);
                if let Some(sink) = self.diagnostics.as_mut() {
                    sink.record("request", &unpacker.dump());
                }
                last_error = Some(error);
                open_wait = Duration::ZERO;
                unpacker.reset();
                send_trigger = true;
            } else {
                last_error = None;
                if unpacker.is_packet_open() {
                    open_wait = open_wait.saturating_add(wait);
                    if self.frame_timeout.is_some_and(|timeout| open_wait >= timeout) {
                        debug!(
                            "Partial frame from 0x{:02X} timed out after {:?}",
                            self.address, open_wait
                        );
                        open_wait = Duration::ZERO;
                        unpacker.reset();
                        send_trigger = true;
                    }
                }
            }

            attempts += 1;
        }

        if !complete {
            return match last_error {
                Some(error) => self.fail(RequestError::PacketError(error)),
                None => self.fail(RequestError::MaxAttempts(self.max_attempts)),
            };
        }

        if let Some(payload) = unpacker.payload() {
            self.rx.extend(payload);
        }
        self.last_status = RequestStatus::PacketRead;

        info!(
            "Read {} byte packet from 0x{:02X} after {} attempt(s)",
            self.rx.len(),
            self.address,
            attempts + 1
        );
        Ok(self.rx.len())
    }

    fn fail(&mut self, error: RequestError) -> std::result::Result<usize, RequestError> {
        self.last_status = error.status();
        warn!("Request to 0x{:02X} failed: {}", self.address, error);
        Err(error)
    }

    /// Send an empty frame so the responder refreshes its output buffer
    fn trigger_update(&mut self) {
        let mut packer = FramePacker::new();
        packer.end();

        self.transport.begin_transmission(self.address);
        while let Some(byte) = packer.read() {
            self.transport.write(byte);
        }

        if let Err(e) = self.transport.end_transmission() {
            debug!("Trigger to 0x{:02X} not delivered: {}", self.address, e);
        }
    }

    pub fn last_status(&self) -> RequestStatus {
        self.last_status
    }

    /// Human-readable form of [`SlaveRequest::last_status`]
    pub fn last_status_str(&self) -> &'static str {
        self.last_status.as_str()
    }

    /// Payload bytes left to read after a successful request
    pub fn available(&self) -> usize {
        if self.last_status != RequestStatus::PacketRead {
            return 0;
        }
        self.rx.remaining()
    }

    /// Read the next payload byte
    pub fn read(&mut self) -> Option<u8> {
        if self.last_status != RequestStatus::PacketRead {
            return None;
        }
        self.rx.read()
    }

    /// The whole payload of the last successful request
    pub fn payload(&self) -> Option<&[u8]> {
        (self.last_status == RequestStatus::PacketRead).then(|| self.rx.as_slice())
    }

    /// Give the transport and delay back
    pub fn into_parts(self) -> (T, D) {
        (self.transport, self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::frame::encoder::encode_frame;
    use crate::frame::protocol::{FRAME_END, FRAME_START};
    use crate::transport::mocks::RecordingDelay;
    use crate::transport::MockTransport;
    use std::collections::VecDeque;

    const ADDRESS: u8 = 0x08;

    /// Transport that answers polls from a script, one entry per poll
    #[derive(Default)]
    struct ScriptedTransport {
        responses: VecDeque<Vec<u8>>,
        inbox: VecDeque<u8>,
        sent: Vec<u8>,
        triggers: usize,
        polls: usize,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            Self {
                responses: responses.into(),
                ..Self::default()
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn begin_transmission(&mut self, _address: u8) {
            self.sent.clear();
        }

        fn write(&mut self, byte: u8) -> usize {
            self.sent.push(byte);
            1
        }

        fn end_transmission(&mut self) -> Result<()> {
            self.triggers += 1;
            Ok(())
        }

        fn request_from(&mut self, _address: u8, len: usize) -> usize {
            self.polls += 1;
            let mut response = self.responses.pop_front().unwrap_or_default();
            response.truncate(len);
            self.inbox = response.into();
            self.inbox.len()
        }

        fn available(&self) -> usize {
            self.inbox.len()
        }

        fn read(&mut self) -> Option<u8> {
            self.inbox.pop_front()
        }
    }

    fn corrupted(payload: &[u8]) -> Vec<u8> {
        let mut frame = encode_frame(payload).unwrap();
        frame[2] ^= 0x40;
        frame
    }

    fn padded(mut frame: Vec<u8>, len: usize) -> Vec<u8> {
        frame.resize(len, 0xFF);
        frame
    }

    #[test]
    fn test_default_settings() {
        let request = SlaveRequest::new(ScriptedTransport::default(), RecordingDelay::default(), ADDRESS, 10);
        assert_eq!(request.read_length(), 14);
        assert_eq!(request.address(), ADDRESS);
        assert_eq!(request.last_status(), RequestStatus::None);
        assert_eq!(request.last_status_str(), "none");
        assert_eq!(request.available(), 0);
    }

    #[test]
    fn test_read_length_capped_at_frame_capacity() {
        let request = SlaveRequest::new(ScriptedTransport::default(), RecordingDelay::default(), ADDRESS, 500);
        assert_eq!(request.read_length(), FRAME_BUFFER_LENGTH);
    }

    #[test]
    fn test_read_length_saturates() {
        let request = SlaveRequest::new(ScriptedTransport::default(), RecordingDelay::default(), ADDRESS, usize::MAX);
        assert_eq!(request.read_length(), FRAME_BUFFER_LENGTH);
    }

    #[test]
    fn test_backoff_saturates_at_max_duration() {
        let responses = (0..3).map(|_| vec![0xFF; 8]).collect();
        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 4);
        request.set_retry_delay(Duration::MAX);
        request.set_attempts(3);

        assert_eq!(request.request(), Err(RequestError::MaxAttempts(3)));
        let (_, delay) = request.into_parts();
        assert_eq!(delay.waits, vec![Duration::MAX; 3]);
    }

    #[test]
    fn test_first_attempt_success() {
        let transport = ScriptedTransport::new(vec![padded(encode_frame(b"hello").unwrap(), 14)]);
        let mut request = SlaveRequest::new(transport, RecordingDelay::default(), ADDRESS, 10);

        assert_eq!(request.request(), Ok(5));
        assert_eq!(request.last_status(), RequestStatus::PacketRead);
        assert_eq!(request.payload(), Some(&b"hello"[..]));
        assert_eq!(request.available(), 5);
        assert_eq!(request.read(), Some(b'h'));
        assert_eq!(request.available(), 4);

        let (transport, delay) = request.into_parts();
        assert_eq!(transport.triggers, 1);
        assert_eq!(transport.polls, 1);
        assert_eq!(delay.waits, vec![DEFAULT_RETRY_DELAY]);
    }

    #[test]
    fn test_trigger_is_empty_frame() {
        let transport = ScriptedTransport::new(vec![encode_frame(b"x").unwrap()]);
        let mut request = SlaveRequest::new(transport, RecordingDelay::default(), ADDRESS, 1);
        request.request().unwrap();

        let (transport, _) = request.into_parts();
        assert_eq!(transport.sent, encode_frame(&[]).unwrap());
        assert_eq!(transport.sent[0], FRAME_START);
        assert_eq!(transport.sent[3], FRAME_END);
    }

    #[test]
    fn test_success_after_corrupted_frames() {
        let k = 3;
        let mut responses: Vec<Vec<u8>> = (1..k).map(|_| corrupted(b"data")).collect();
        responses.push(encode_frame(b"data").unwrap());

        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 4);

        assert_eq!(request.request(), Ok(4));
        assert_eq!(request.last_status(), RequestStatus::PacketRead);
        assert_eq!(request.payload(), Some(&b"data"[..]));

        let (transport, delay) = request.into_parts();
        // every decode error re-triggers
        assert_eq!(transport.triggers, k);
        assert_eq!(transport.polls, k);
        assert_eq!(
            delay.waits,
            vec![
                Duration::from_millis(10),
                Duration::from_millis(20),
                Duration::from_millis(30),
            ]
        );
    }

    #[test]
    fn test_always_corrupted_exhausts_with_packet_error() {
        let responses = (0..10).map(|_| corrupted(b"data")).collect();
        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 4);
        request.set_attempts(4);

        assert_eq!(
            request.request(),
            Err(RequestError::PacketError(DecodeError::InvalidChecksum))
        );
        assert_eq!(request.last_status(), RequestStatus::PacketError);
        assert_eq!(request.last_status_str(), "packet error");
        assert_eq!(request.payload(), None);
        assert_eq!(request.read(), None);

        let (transport, delay) = request.into_parts();
        assert_eq!(transport.polls, 4);
        assert_eq!(transport.triggers, 4);
        assert_eq!(delay.waits.len(), 4);
    }

    #[test]
    fn test_idle_bus_exhausts_with_max_attempts() {
        let responses = (0..5).map(|_| vec![0xFF; 8]).collect();
        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 4);

        assert_eq!(request.request(), Err(RequestError::MaxAttempts(5)));
        assert_eq!(request.last_status(), RequestStatus::MaxAttempts);

        let (transport, _) = request.into_parts();
        // nothing was ever decoded, so the trigger is only sent once
        assert_eq!(transport.triggers, 1);
        assert_eq!(transport.polls, 5);
    }

    #[test]
    fn test_partial_frame_polls_again_without_trigger() {
        let frame = encode_frame(b"split me").unwrap();
        let (head, tail) = frame.split_at(5);
        let responses = vec![head.to_vec(), tail.to_vec()];

        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 8);

        assert_eq!(request.request(), Ok(8));
        assert_eq!(request.payload(), Some(&b"split me"[..]));

        let (transport, _) = request.into_parts();
        assert_eq!(transport.triggers, 1);
        assert_eq!(transport.polls, 2);
    }

    #[test]
    fn test_empty_payload_is_success() {
        let transport = ScriptedTransport::new(vec![encode_frame(&[]).unwrap()]);
        let mut request = SlaveRequest::new(transport, RecordingDelay::default(), ADDRESS, 0);

        assert_eq!(request.request(), Ok(0));
        assert_eq!(request.last_status(), RequestStatus::PacketRead);
        assert_eq!(request.payload(), Some(&[][..]));
    }

    #[test]
    fn test_frame_timeout_retriggers_stuck_frame() {
        let frame = encode_frame(b"abcdef").unwrap();
        let responses = vec![
            frame[..4].to_vec(),
            vec![0xFF; 4],
            vec![0xFF; 4],
            frame.clone(),
        ];

        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 6);
        request.set_frame_timeout(Some(Duration::from_millis(30)));

        assert_eq!(request.request(), Ok(6));

        let (transport, _) = request.into_parts();
        // open for 10 + 20 ms reaches the 30 ms timeout
        assert_eq!(transport.triggers, 2);
        assert_eq!(transport.polls, 4);
    }

    #[test]
    fn test_without_timeout_stuck_frame_exhausts() {
        let frame = encode_frame(b"abcdef").unwrap();
        let responses = vec![frame[..4].to_vec(), vec![0xFF; 4], vec![0xFF; 4], frame.clone()];

        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 6);
        request.set_attempts(3);

        // idle bytes are taken as payload until the end position mismatches
        assert_eq!(
            request.request(),
            Err(RequestError::PacketError(DecodeError::InvalidLength))
        );
        let (transport, _) = request.into_parts();
        assert_eq!(transport.triggers, 1);
        assert_eq!(transport.polls, 3);
    }

    #[test]
    fn test_peer_not_found_is_immediate() {
        let mut transport = MockTransport::new();
        transport.expect_begin_transmission().with(mockall::predicate::eq(ADDRESS)).times(1).return_const(());
        transport.expect_write().times(4).return_const(1usize);
        transport.expect_end_transmission().times(1).returning(|| Ok(()));
        transport
            .expect_request_from()
            .with(mockall::predicate::eq(ADDRESS), mockall::predicate::eq(8usize))
            .times(1)
            .return_const(0usize);
        transport.expect_available().times(0);
        transport.expect_read().times(0);

        let mut delay = RecordingDelay::default();
        let mut request = SlaveRequest::new(transport, &mut delay, ADDRESS, 4);

        assert_eq!(request.request(), Err(RequestError::PeerNotFound(ADDRESS)));
        assert_eq!(request.last_status(), RequestStatus::PeerNotFound);
        assert_eq!(request.last_status_str(), "peer not found");
        drop(request);

        assert_eq!(delay.waits.len(), 1);
    }

    #[test]
    fn test_undelivered_trigger_still_polls() {
        let mut transport = MockTransport::new();
        transport.expect_begin_transmission().return_const(());
        transport.expect_write().return_const(1usize);
        transport
            .expect_end_transmission()
            .times(1)
            .returning(|| Err(crate::error::WireError::Transport("nack".to_string())));
        transport.expect_request_from().times(1).return_const(0usize);

        let mut request = SlaveRequest::new(transport, RecordingDelay::default(), ADDRESS, 4);
        assert_eq!(request.request(), Err(RequestError::PeerNotFound(ADDRESS)));
    }

    #[test]
    fn test_new_request_clears_previous_payload() {
        let responses = vec![encode_frame(b"first").unwrap(), vec![]];
        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 5);

        assert!(request.request().is_ok());
        assert!(request.request().is_err());
        assert_eq!(request.available(), 0);
        assert_eq!(request.payload(), None);
    }

    #[test]
    fn test_zero_attempts_fails_without_polling() {
        let mut request = SlaveRequest::new(ScriptedTransport::default(), RecordingDelay::default(), ADDRESS, 4);
        request.set_attempts(0);

        assert_eq!(request.request(), Err(RequestError::MaxAttempts(0)));
        let (transport, delay) = request.into_parts();
        assert_eq!(transport.polls, 0);
        assert!(delay.waits.is_empty());
    }

    #[test]
    fn test_decode_errors_reach_diagnostics() {
        use crate::diagnostics::FrameDump;
        use std::sync::{Arc, Mutex};

        struct Collect(Arc<Mutex<Vec<FrameDump>>>);
        impl DiagnosticSink for Collect {
            fn record(&mut self, _context: &str, dump: &FrameDump) {
                self.0.lock().unwrap().push(dump.clone());
            }
        }

        let dumps = Arc::new(Mutex::new(Vec::new()));
        let responses = vec![corrupted(b"zz"), encode_frame(b"zz").unwrap()];
        let mut request = SlaveRequest::new(ScriptedTransport::new(responses), RecordingDelay::default(), ADDRESS, 2)
            .with_diagnostics(Box::new(Collect(Arc::clone(&dumps))));

        assert!(request.request().is_ok());
        let dumps = dumps.lock().unwrap();
        assert_eq!(dumps.len(), 1);
        assert_eq!(dumps[0].error.as_deref(), Some("invalid crc"));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(RequestStatus::None.to_string(), "none");
        assert_eq!(RequestStatus::PacketRead.to_string(), "packet read");
        assert_eq!(RequestStatus::PeerNotFound.to_string(), "peer not found");
        assert_eq!(RequestStatus::PacketError.to_string(), "packet error");
        assert_eq!(RequestStatus::MaxAttempts.to_string(), "max attempts");
    }

    #[test]
    fn test_from_config() {
        let config = RequestConfig {
            address: 0x30,
            response_length: 20,
            retry_delay_ms: 5,
            max_attempts: 2,
            frame_timeout_ms: Some(50),
            interval_ms: 1000,
        };
        let request = SlaveRequest::from_config(ScriptedTransport::default(), RecordingDelay::default(), &config);

        assert_eq!(request.address(), 0x30);
        assert_eq!(request.read_length(), 24);
        assert_eq!(request.retry_delay, Duration::from_millis(5));
        assert_eq!(request.max_attempts, 2);
        assert_eq!(request.frame_timeout, Some(Duration::from_millis(50)));
    }
}
