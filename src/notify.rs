//! Transient user-facing messages.
//!
//! The form reports outcomes through a [`NotificationSink`]; how they are
//! shown (stderr line, auto-dismissing toast) is up to the sink.

use std::fmt;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warn,
    Error,
}

impl Severity {
    /// Short heading shown above the message.
    pub fn summary(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Info => "Info",
            Self::Warn => "Warning",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

/// Fire-and-forget receiver of notifications.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Writes notifications to stderr, for the one-shot subcommands.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, n: Notification) {
        debug!(severity = %n.severity, message = %n.message, "notification");
        eprintln!("{}: {}", n.severity, n.message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Keeps every notification for assertions.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub seen: Vec<Notification>,
    }

    impl RecordingSink {
        pub fn count(&self, severity: Severity) -> usize {
            self.seen.iter().filter(|n| n.severity == severity).count()
        }
    }

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, notification: Notification) {
            self.seen.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summaries() {
        assert_eq!(Severity::Success.summary(), "Success");
        assert_eq!(Severity::Info.summary(), "Info");
        assert_eq!(Severity::Warn.summary(), "Warning");
        assert_eq!(Severity::Error.to_string(), "Error");
    }
}
