//! Logging and escalation of recoverable errors.
//!
//! Readers and writers never decide on their own whether a recoverable
//! problem is fatal. They report it to the [`DebugContext`], which logs it
//! according to the [`LoggingPolicy`] and turns it into
//! [`Error::Aborted`] according to the [`ErrorHandlingPolicy`].
//!
//! Writer and reader must use matching policies: a strict writer that aborts
//! leaves a truncated stream behind, which a resilient reader would happily
//! accept as complete.

use crate::config::{ErrorHandlingPolicy, LoggingPolicy};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Sink for serialization diagnostics.
pub trait SerializationLogger: Send + Sync {
    /// Log a warning
    fn log_warning(&self, message: &str);

    /// Log an error
    fn log_error(&self, message: &str);

    /// Log an informational message
    fn log_info(&self, message: &str);
}

/// Logger forwarding to `tracing` under the `graphstream` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl SerializationLogger for TracingLogger {
    fn log_warning(&self, message: &str) {
        tracing::warn!(target: "graphstream", "{}", message);
    }

    fn log_error(&self, message: &str) {
        tracing::error!(target: "graphstream", "{}", message);
    }

    fn log_info(&self, message: &str) {
        tracing::info!(target: "graphstream", "{}", message);
    }
}

/// Shared handle to a [`SerializationLogger`].
#[derive(Clone)]
pub struct LoggerHandle(Arc<dyn SerializationLogger>);

impl LoggerHandle {
    /// Wrap a logger.
    pub fn new(logger: Arc<dyn SerializationLogger>) -> Self {
        LoggerHandle(logger)
    }

    /// The wrapped logger.
    pub fn logger(&self) -> &dyn SerializationLogger {
        self.0.as_ref()
    }
}

impl Default for LoggerHandle {
    fn default() -> Self {
        LoggerHandle(Arc::new(TracingLogger))
    }
}

impl fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LoggerHandle")
    }
}

/// Logging and error escalation policy of a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebugContext {
    /// Which messages reach the logger
    #[serde(default)]
    pub logging_policy: LoggingPolicy,

    /// Which messages abort the session
    #[serde(default)]
    pub error_handling_policy: ErrorHandlingPolicy,

    /// Destination of logged messages
    #[serde(skip)]
    pub logger: LoggerHandle,
}

impl DebugContext {
    /// Replace the logger (builder pattern).
    pub fn with_logger(mut self, logger: Arc<dyn SerializationLogger>) -> Self {
        self.logger = LoggerHandle::new(logger);
        self
    }

    /// Report a warning.
    ///
    /// Returns `Err(Error::Aborted)` under `ThrowOnWarningsAndErrors`.
    pub fn log_warning(&self, message: impl AsRef<str>) -> Result<()> {
        let message = message.as_ref();
        if self.error_handling_policy == ErrorHandlingPolicy::ThrowOnWarningsAndErrors {
            return Err(Error::Aborted(message.to_string()));
        }
        if self.logging_policy == LoggingPolicy::LogWarningsAndErrors {
            self.logger.logger().log_warning(message);
        }
        Ok(())
    }

    /// Report an error.
    ///
    /// Returns `Err(Error::Aborted)` under any policy other than `Resilient`.
    pub fn log_error(&self, message: impl AsRef<str>) -> Result<()> {
        let message = message.as_ref();
        if self.error_handling_policy != ErrorHandlingPolicy::Resilient {
            return Err(Error::Aborted(message.to_string()));
        }
        if self.logging_policy != LoggingPolicy::Silent {
            self.logger.logger().log_error(message);
        }
        Ok(())
    }

    /// Report an informational message. Never escalates.
    pub fn log_info(&self, message: impl AsRef<str>) {
        if self.logging_policy == LoggingPolicy::LogWarningsAndErrors {
            self.logger.logger().log_info(message.as_ref());
        }
    }
}
