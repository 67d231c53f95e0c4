//! Serialization configuration.
//!
//! A [`SerializationConfig`] travels inside every session context. It carries
//! the debug policy (how recoverable errors are logged or escalated) and the
//! per-codec options writers pick up when they are created.
//!
//! # Example
//!
//! ```toml
//! [debug]
//! logging_policy = "log_warnings_and_errors"
//! error_handling_policy = "resilient"
//!
//! [binary]
//! staging_buffer_size = 65536
//! compress_strings = true
//!
//! [json]
//! format_as_readable = false
//! ```

use crate::debug::DebugContext;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default staging buffer size for binary and JSON codecs (64KB).
pub const DEFAULT_STAGING_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest staging buffer accepted by [`BinaryOptions::validate`].
///
/// Every atomic binary write (tag plus a 16-byte payload) fits in this.
pub const MIN_STAGING_BUFFER_SIZE: usize = 32;

/// Which recoverable errors reach the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingPolicy {
    /// Log errors only
    #[default]
    LogErrors,
    /// Log warnings and errors
    LogWarningsAndErrors,
    /// Log nothing
    Silent,
}

/// Which recoverable errors abort the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorHandlingPolicy {
    /// Never abort on recoverable errors
    #[default]
    Resilient,
    /// Abort on errors
    ThrowOnErrors,
    /// Abort on warnings and errors
    ThrowOnWarningsAndErrors,
}

/// Binary codec options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryOptions {
    /// Staging buffer size in bytes (default: 64KB).
    #[serde(default = "default_staging_buffer_size")]
    pub staging_buffer_size: usize,

    /// Write strings with one byte per char when every char is <= U+00FF
    /// (default: true).
    #[serde(default = "default_true")]
    pub compress_strings: bool,
}

/// JSON codec options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOptions {
    /// Newlines and indentation (default: false, packed output).
    #[serde(default)]
    pub format_as_readable: bool,

    /// Write a type's name once and its id afterwards (default: true).
    #[serde(default = "default_true")]
    pub enable_type_optimization: bool,
}

fn default_staging_buffer_size() -> usize {
    DEFAULT_STAGING_BUFFER_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for BinaryOptions {
    fn default() -> Self {
        BinaryOptions {
            staging_buffer_size: DEFAULT_STAGING_BUFFER_SIZE,
            compress_strings: true,
        }
    }
}

impl Default for JsonOptions {
    fn default() -> Self {
        JsonOptions {
            format_as_readable: false,
            enable_type_optimization: true,
        }
    }
}

impl BinaryOptions {
    /// Validate the options.
    pub fn validate(&self) -> Result<()> {
        if self.staging_buffer_size < MIN_STAGING_BUFFER_SIZE {
            return Err(Error::Config(format!(
                "staging buffer must be at least {} bytes, got {}",
                MIN_STAGING_BUFFER_SIZE, self.staging_buffer_size
            )));
        }
        Ok(())
    }
}

/// Configuration carried by serialization and deserialization contexts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SerializationConfig {
    /// Logging and escalation policy
    #[serde(default)]
    pub debug: DebugContext,

    /// Binary codec options
    #[serde(default)]
    pub binary: BinaryOptions,

    /// JSON codec options
    #[serde(default)]
    pub json: JsonOptions,
}

impl SerializationConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logging policy (builder pattern).
    pub fn with_logging_policy(mut self, policy: LoggingPolicy) -> Self {
        self.debug.logging_policy = policy;
        self
    }

    /// Set the error handling policy (builder pattern).
    pub fn with_error_handling_policy(mut self, policy: ErrorHandlingPolicy) -> Self {
        self.debug.error_handling_policy = policy;
        self
    }

    /// Set the staging buffer size (builder pattern).
    pub fn with_staging_buffer_size(mut self, size: usize) -> Self {
        self.binary.staging_buffer_size = size;
        self
    }

    /// Enable or disable 8-bit string compression (builder pattern).
    pub fn with_compressed_strings(mut self, enabled: bool) -> Self {
        self.binary.compress_strings = enabled;
        self
    }

    /// Enable or disable readable JSON output (builder pattern).
    pub fn with_readable_json(mut self, enabled: bool) -> Self {
        self.json.format_as_readable = enabled;
        self
    }

    /// Configuration that aborts on every warning and error.
    pub fn strict() -> Self {
        Self::default()
            .with_logging_policy(LoggingPolicy::LogWarningsAndErrors)
            .with_error_handling_policy(ErrorHandlingPolicy::ThrowOnWarningsAndErrors)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        self.binary.validate()
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SerializationConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
