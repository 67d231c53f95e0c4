//! Error types for graphstream
//!
//! This module defines the errors that interrupt a serialization session.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Recoverable data errors (a mismatched entry, a number that fails to parse,
//! an unresolved external reference) are NOT represented here: readers log
//! them through the [`DebugContext`](crate::DebugContext) and return `Ok(None)`.
//! They only become an [`Error::Aborted`] when the context's error handling
//! policy escalates them.

use std::io;
use thiserror::Error;

/// Result type alias for graphstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a serialization or deserialization session
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A recoverable error escalated by a strict error handling policy
    #[error("Serialization aborted: {0}")]
    Aborted(String),

    /// A single atomic write is larger than the whole staging buffer
    #[error("Staging buffer capacity exceeded: requested {requested} bytes, capacity is {capacity} bytes")]
    CapacityExceeded {
        /// Bytes the write needed in one piece
        requested: usize,
        /// Total staging buffer capacity
        capacity: usize,
    },

    /// Begin/End calls were not correctly paired or nested
    #[error("Protocol violation: {0}")]
    Protocol(String),

    /// No serializer is registered for a runtime type
    #[error("No serializer registered for type {0}")]
    NoSerializer(String),

    /// The data format cannot be used through the requested entry point
    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error was produced by policy escalation rather than a
    /// structural or I/O failure.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Error::Aborted(_))
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
