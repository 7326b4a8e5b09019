//! Severity-tiered error events and the channel that routes them.
//!
//! Every anomaly the sync engine sees becomes an [`ErrorEvent`]. Events are
//! handed to an [`ErrorChannel`], which logs them, notifies operators, and
//! decides whether the run keeps going.

pub mod channel;
pub mod email;
pub mod notify;

pub use channel::ErrorChannel;
pub use email::SmtpNotifier;
pub use notify::{LogNotifier, Notifier, NotifyError};

use std::fmt;

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Routine status, e.g. throttling applied or a full day recorded.
    Info,
    /// A partial or empty day.
    Warning,
    /// Local failures such as database access.
    Error,
    /// Remote API failures, a silent station, unhandled faults.
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Critical => "Critical",
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Critical => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single anomaly or status message raised during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    pub message: String,
    pub severity: Severity,
    /// Collapse into the end-of-run digest instead of notifying immediately.
    pub batchable: bool,
    /// Abort the run once the event has been recorded.
    pub terminate: bool,
    /// Send an operator notification (immediately, or in the digest).
    pub notify: bool,
}

impl ErrorEvent {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            batchable: false,
            terminate: false,
            notify: false,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn critical(message: impl Into<String>) -> Self {
        Self::new(Severity::Critical, message)
    }

    pub fn batched(mut self) -> Self {
        self.batchable = true;
        self
    }

    pub fn notify(mut self) -> Self {
        self.notify = true;
        self
    }

    pub fn terminate(mut self) -> Self {
        self.terminate = true;
        self
    }
}

/// The run was aborted by a terminating [`ErrorEvent`].
///
/// Carries the event's message so that the abort is never silent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{severity}: {message}")]
pub struct Terminated {
    pub severity: Severity,
    pub message: String,
}

/// Renders an error and its `source()` chain as one line.
///
/// Stops at the first cause whose text is already part of the line; HTTP
/// client errors tend to embed their whole chain in `Display`.
pub fn describe(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if text.contains(&cause_text) {
            break;
        }
        text.push_str(": ");
        text.push_str(&cause_text);
        source = cause.source();
    }
    text
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
