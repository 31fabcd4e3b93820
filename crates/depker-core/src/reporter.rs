//! Reporter trait for dependency injection
//!
//! This trait allows core logic to report progress and status without
//! being coupled to a specific terminal implementation. Standard output
//! belongs to the delegated child, so implementations should write
//! elsewhere.

use std::fmt;
use std::path::Path;

/// Progress and status sink for the launcher core.
pub trait Reporter: fmt::Debug {
    /// Indicates a new phase has started (e.g. "Installing deno").
    fn section(&self, title: &str);

    /// An archive download is starting.
    fn downloading(&self, url: &str);

    /// An archive is being unpacked into `dest`.
    fn extracting(&self, dest: &Path);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn downloading(&self, _: &str) {}
    fn extracting(&self, _: &Path) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
