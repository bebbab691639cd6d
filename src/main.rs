//! # Wirelink
//!
//! Demo of a requester and a responder exchanging checksummed frames over
//! an in-memory bus.
//!
//! The responder runs on a tokio interval task; the requester runs on a
//! blocking task because its backoff waits are blocking sleeps.

use anyhow::{Context, Result};
use std::sync::mpsc;
use tokio::sync::watch;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use wirelink::config::{Config, LoggingConfig};
use wirelink::diagnostics;
use wirelink::frame::encoder::{encode_frame, FramePacker};
use wirelink::request::SlaveRequest;
use wirelink::slave::{Slave, SlaveHandler, UpdateOutcome};
use wirelink::transport::{MemoryBus, MemoryMaster, StdDelay, Transport};

/// File name prefix for the daily log file
const LOG_FILE_PREFIX: &str = "wirelink.log";

/// Number of requests between status log messages
const LOG_INTERVAL_REQUESTS: u64 = 10;

/// Payload sent to the responder once at startup; echoed in every response
const GREETING: &[u8] = b"hello";

/// Responder that answers each trigger with a counter and the last payload it got
#[derive(Debug, Default)]
struct EchoCounter {
    count: u32,
    last: Vec<u8>,
}

impl SlaveHandler for EchoCounter {
    fn on_receive(&mut self, payload: &[u8]) {
        self.last = payload.to_vec();
    }

    fn on_request(&mut self, response: &mut FramePacker) {
        self.count = self.count.wrapping_add(1);
        response.write(format!("#{} ", self.count).as_bytes());
        response.write(&self.last);
    }
}

/// Request outcomes seen by the requester task
#[derive(Debug, Default, Clone, Copy)]
struct RequestTotals {
    succeeded: u64,
    failed: u64,
}

/// Responder outcomes seen by the slave task
#[derive(Debug, Default, Clone, Copy)]
struct SlaveTotals {
    received: u64,
    responded: u64,
    rejected: u64,
}

/// Main entry point for the Wirelink demo
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or built-in defaults)
///    - Set up logging to stdout, and to a daily log file if configured
///    - Build the in-memory bus and apply fault injection
///
/// 2. **Main Loop**
///    - Responder task: `Slave::update` every `poll_interval_ms`
///    - Requester task: `SlaveRequest::request` every `interval_ms`
///    - Handle Ctrl+C for graceful shutdown
///
/// 3. **Graceful Shutdown**
///    - Stop both tasks
///    - Log totals and bus counters
///
/// # Errors
///
/// Returns error if:
/// - The configuration file cannot be read or is invalid
/// - The diagnostics sink cannot be opened
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/wirelink.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO wirelink: Wirelink v0.1.0 starting...
/// INFO wirelink: Responder at 0x08, polling every 2ms
/// INFO wirelink::request: Read 8 byte packet from 0x08 after 1 attempt(s)
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging);

    info!("Wirelink v{} starting...", env!("CARGO_PKG_VERSION"));

    let bus = MemoryBus::new(config.request.address);
    if config.bus.corrupt_every > 0 {
        bus.set_corrupt_every(config.bus.corrupt_every);
        info!("Corrupting every {} poll(s)", config.bus.corrupt_every);
    }

    let mut slave = Slave::new(bus.slave(), EchoCounter::default())
        .with_diagnostics(diagnostics::from_config(&config.diagnostics)?);
    let sink = diagnostics::from_config(&config.diagnostics)?;

    let mut master = bus.master();
    send_greeting(&mut master, config.request.address);
    slave.update();

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let poll_interval = Duration::from_millis(config.slave.poll_interval_ms);

    info!(
        "Responder at 0x{:02X}, polling every {}ms",
        config.request.address, config.slave.poll_interval_ms
    );

    let slave_task = tokio::spawn(async move {
        let mut ticker = interval(poll_interval);
        let mut totals = SlaveTotals::default();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match slave.update() {
                        UpdateOutcome::Received(len) => {
                            debug!("Responder got {} byte payload", len);
                            totals.received += 1;
                        }
                        UpdateOutcome::Responded(_) => totals.responded += 1,
                        UpdateOutcome::Rejected(_) => totals.rejected += 1,
                        UpdateOutcome::Idle | UpdateOutcome::Pending => {}
                    }
                }
                _ = shutdown_rx.changed() => break,
            }
        }

        totals
    });

    let (stop_tx, stop_rx) = mpsc::channel::<()>();
    let request_config = config.request.clone();

    let request_task = tokio::task::spawn_blocking(move || {
        let mut request =
            SlaveRequest::from_config(master, StdDelay, &request_config).with_diagnostics(sink);
        let period = Duration::from_millis(request_config.interval_ms);
        let mut totals = RequestTotals::default();

        loop {
            match request.request() {
                Ok(_) => {
                    totals.succeeded += 1;
                    let payload = request.payload().unwrap_or_default();
                    info!(
                        "Response: '{}' ({})",
                        String::from_utf8_lossy(payload),
                        request.last_status()
                    );
                }
                Err(e) => {
                    totals.failed += 1;
                    warn!("Request failed: {} ({})", e, request.last_status_str());
                }
            }

            let total = totals.succeeded + totals.failed;
            if total % LOG_INTERVAL_REQUESTS == 0 {
                info!(
                    "{} requests, {} succeeded, {} failed",
                    total, totals.succeeded, totals.failed
                );
            }

            match stop_rx.recv_timeout(period) {
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                _ => break,
            }
        }

        totals
    });

    info!("Requesting every {}ms", config.request.interval_ms);
    info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
    info!("Received Ctrl+C, shutting down...");

    let _ = stop_tx.send(());
    let _ = shutdown_tx.send(true);

    let requests = request_task.await.context("requester task panicked")?;
    let slave_totals = slave_task.await.context("responder task panicked")?;
    let stats = bus.stats();

    info!(
        "Total requests: {} ({} succeeded, {} failed)",
        requests.succeeded + requests.failed,
        requests.succeeded,
        requests.failed
    );
    info!(
        "Responder: {} payloads, {} responses, {} rejected",
        slave_totals.received, slave_totals.responded, slave_totals.rejected
    );
    info!(
        "Bus: {} transmissions, {} polls, {} corrupted",
        stats.transmissions, stats.polls, stats.corrupted
    );

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. With a log directory set, output
/// also goes to a daily rolling file and the returned guard must be kept alive.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (file_writer, guard) = match log_file(config) {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    build_subscriber(config, file_writer).init();
    guard
}

/// Non-blocking daily file writer for the configured log directory
fn log_file(config: &LoggingConfig) -> Option<(NonBlocking, WorkerGuard)> {
    let directory = config.directory.as_deref()?;
    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    Some(tracing_appender::non_blocking(appender))
}

/// Stdout layer, plus a plain-text file layer when a file writer is given
fn build_subscriber(
    config: &LoggingConfig,
    file_writer: Option<NonBlocking>,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let file_layer = file_writer.map(|writer| fmt::layer().with_writer(writer).with_ansi(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
}

/// Hand the responder a payload to echo back
fn send_greeting(master: &mut MemoryMaster, address: u8) {
    let frame = match encode_frame(GREETING) {
        Ok(frame) => frame,
        Err(e) => {
            warn!("Greeting not encoded: {}", e);
            return;
        }
    };

    master.begin_transmission(address);
    for byte in frame {
        master.write(byte);
    }
    if let Err(e) = master.end_transmission() {
        warn!("Greeting not delivered: {}", e);
    }
}
