//! The [`Log`] trait shared by every logging backend.

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) writes straight through `tracing`;
/// [`BufferedLog`](super::buffered::BufferedLog) keeps messages in memory.
/// The mirror walk only sees this trait, so it never knows which one it got.
pub trait Log: Send + Sync {
    /// Log an informational message (an action that was carried out).
    fn info(&self, msg: &str);
    /// Log a debug message (suppressed on console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that a dry run would have carried out.
    fn dry_run(&self, msg: &str);
}

/// Severity and channel of a single log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Verbose-only detail.
    Debug,
    /// A carried-out action.
    Info,
    /// A would-be action reported by a dry run.
    DryRun,
    /// Something the user should look at.
    Warn,
    /// A failure.
    Error,
}
