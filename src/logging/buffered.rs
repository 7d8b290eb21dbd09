//! In-memory logger that keeps every message for later inspection.
use std::sync::Mutex;

use super::types::{Level, Log};

/// A single buffered log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Channel the message was logged on.
    pub level: Level,
    /// The message text.
    pub message: String,
}

/// Implement the methods of [`Log`] by buffering each message into
/// `self.entries` under the corresponding [`Level`].
macro_rules! buffer_log_methods {
    ($($method:ident => $level:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.push(Level::$level, msg);
            }
        )+
    };
}

/// Logger that captures output in memory instead of writing it, so a
/// caller can inspect exactly what a mirror run reported.
#[derive(Debug, Default)]
pub struct BufferedLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLog {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of every entry logged so far.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map_or_else(|_| Vec::new(), |guard| guard.clone())
    }

    /// Return the messages logged at `level`, in order.
    #[must_use]
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.level == level)
            .map(|e| e.message)
            .collect()
    }

    fn push(&self, level: Level, msg: &str) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(LogEntry {
                level,
                message: msg.to_string(),
            });
        }
    }
}

impl Log for BufferedLog {
    buffer_log_methods! {
        info    => Info,
        debug   => Debug,
        warn    => Warn,
        error   => Error,
        dry_run => DryRun,
    }
}
