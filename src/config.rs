//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Result, WireError};
use crate::frame::protocol::MAX_PAYLOAD_LENGTH;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub slave: SlaveConfig,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Requester configuration
#[derive(Debug, Deserialize, Clone)]
pub struct RequestConfig {
    #[serde(default = "default_address")]
    pub address: u8,

    #[serde(default = "default_response_length")]
    pub response_length: usize,

    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,

    #[serde(default)]
    pub frame_timeout_ms: Option<u64>,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

/// Responder configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SlaveConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// In-memory bus configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BusConfig {
    /// Flip a bit in every n-th poll (0 = never)
    #[serde(default)]
    pub corrupt_every: u32,
}

/// Diagnostic sink configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DiagnosticsConfig {
    #[serde(default = "default_sink")]
    pub sink: String,

    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub directory: Option<String>,
}

// Default value functions
fn default_address() -> u8 { 0x08 }
fn default_response_length() -> usize { 32 }
fn default_retry_delay_ms() -> u64 { 10 }
fn default_max_attempts() -> u8 { 5 }
fn default_interval_ms() -> u64 { 1000 }

fn default_poll_interval_ms() -> u64 { 2 }

fn default_sink() -> String { "tracing".to_string() }

fn default_log_level() -> String { "info".to_string() }

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            response_length: default_response_length(),
            retry_delay_ms: default_retry_delay_ms(),
            max_attempts: default_max_attempts(),
            frame_timeout_ms: None,
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for SlaveConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            sink: default_sink(),
            path: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn invalid(message: impl std::fmt::Display) -> WireError {
    WireError::Config(toml::de::Error::custom(message))
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wirelink::config::Config;
    ///
    /// let config = Config::load("config/wirelink.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        // 7-bit addresses, reserved ranges excluded
        if !(0x08..=0x77).contains(&self.request.address) {
            return Err(invalid("address must be between 0x08 and 0x77"));
        }

        if self.request.response_length > MAX_PAYLOAD_LENGTH {
            return Err(invalid(format!(
                "response_length must be at most {}",
                MAX_PAYLOAD_LENGTH
            )));
        }

        if self.request.retry_delay_ms == 0 || self.request.retry_delay_ms > 10000 {
            return Err(invalid("retry_delay_ms must be between 1 and 10000"));
        }

        if self.request.max_attempts == 0 {
            return Err(invalid("max_attempts must be greater than 0"));
        }

        if self.request.frame_timeout_ms == Some(0) {
            return Err(invalid("frame_timeout_ms must be greater than 0 when set"));
        }

        if self.request.interval_ms == 0 || self.request.interval_ms > 60000 {
            return Err(invalid("interval_ms must be between 1 and 60000"));
        }

        if self.slave.poll_interval_ms == 0 || self.slave.poll_interval_ms > 10000 {
            return Err(invalid("poll_interval_ms must be between 1 and 10000"));
        }

        match self.diagnostics.sink.as_str() {
            "none" | "tracing" => {}
            "jsonl" => {
                if self.diagnostics.path.as_deref().map_or(true, str::is_empty) {
                    return Err(invalid("diagnostics path is required for the jsonl sink"));
                }
            }
            _ => {
                return Err(invalid("diagnostics sink must be one of: none, tracing, jsonl"));
            }
        }

        if !["trace", "debug", "info", "warn", "error"].contains(&self.logging.level.as_str()) {
            return Err(invalid("log level must be one of: trace, debug, info, warn, error"));
        }

        if self.logging.directory.as_deref() == Some("") {
            return Err(invalid("log directory cannot be empty when set"));
        }

        Ok(())
    }
}
