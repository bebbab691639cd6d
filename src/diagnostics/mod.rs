//! # Diagnostics Module
//!
//! Pluggable sinks for frame dumps.
//!
//! This module handles:
//! - Snapshotting packer/unpacker state as a [`FrameDump`]
//! - Rendering dumps as ascii + hex for humans
//! - Writing dumps to `tracing` or to a JSONL file
//! - Picking the sink from runtime configuration

use serde::Serialize;
use std::fmt::Write as _;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::config::DiagnosticsConfig;
use crate::error::{Result, WireError};

/// Which side of the codec produced a dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DumpRole {
    Packer,
    Unpacker,
}

/// Snapshot of a packer or unpacker buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameDump {
    pub role: DumpRole,
    pub open: bool,
    pub total_length: usize,
    pub expected_length: Option<usize>,
    pub error: Option<String>,
    pub bytes: Vec<u8>,
}

impl FrameDump {
    /// Printable ascii bytes as-is, everything else as `.`
    pub fn ascii(&self) -> String {
        self.bytes
            .iter()
            .map(|&b| if (32..127).contains(&b) { b as char } else { '.' })
            .collect()
    }

    /// Space separated upper-case hex, e.g. `"02 05 41 .."`
    pub fn hex(&self) -> String {
        let mut out = String::with_capacity(self.bytes.len() * 3);
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{:02X}", byte);
        }
        out
    }
}

/// Destination for frame dumps
pub trait DiagnosticSink: Send {
    fn record(&mut self, context: &str, dump: &FrameDump);
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&mut self, _context: &str, _dump: &FrameDump) {}
}

/// Logs dumps at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&mut self, context: &str, dump: &FrameDump) {
        if dump.bytes.is_empty() {
            debug!(
                context,
                role = ?dump.role,
                open = dump.open,
                total_length = dump.total_length,
                error = dump.error.as_deref().unwrap_or("none"),
                "frame dump: empty"
            );
            return;
        }

        debug!(
            context,
            role = ?dump.role,
            open = dump.open,
            total_length = dump.total_length,
            expected_length = ?dump.expected_length,
            error = dump.error.as_deref().unwrap_or("none"),
            "frame dump: '{}' [{}]",
            dump.ascii(),
            dump.hex()
        );
    }
}

/// JSON line written by [`JsonlSink`]
#[derive(Serialize)]
struct JsonlRecord<'a> {
    timestamp: String,
    context: &'a str,
    #[serde(flatten)]
    dump: &'a FrameDump,
}

/// Appends one JSON object per dump to a file
pub struct JsonlSink<W: Write + Send = BufWriter<File>> {
    writer: W,
}

impl JsonlSink {
    /// Open (or create) `path` for appending
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_record(&mut self, context: &str, dump: &FrameDump) -> Result<()> {
        let record = JsonlRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            context,
            dump,
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> DiagnosticSink for JsonlSink<W> {
    fn record(&mut self, context: &str, dump: &FrameDump) {
        if let Err(e) = self.write_record(context, dump) {
            warn!("Failed to write diagnostic record: {}", e);
        }
    }
}

/// Build the sink selected by configuration
///
/// # Errors
///
/// Returns error if the sink name is unknown, or the JSONL file cannot be opened
pub fn from_config(config: &DiagnosticsConfig) -> Result<Box<dyn DiagnosticSink>> {
    match config.sink.as_str() {
        "none" => Ok(Box::new(NullSink)),
        "tracing" => Ok(Box::new(TracingSink)),
        "jsonl" => {
            let path = config.path.as_deref().ok_or_else(|| {
                WireError::Diagnostics("jsonl sink requires a path".to_string())
            })?;
            Ok(Box::new(JsonlSink::create(path)?))
        }
        other => Err(WireError::Diagnostics(format!("unknown sink '{}'", other))),
    }
}
