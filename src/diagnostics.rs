//! Diagnostics sinks
//!
//! Store comparisons, trie dumps and statistics dumps are emitted as
//! human-readable lines through a [`DiagnosticsSink`]. Nothing inside the crate
//! parses these lines back.

use parking_lot::Mutex;

/// Receiver for line-oriented diagnostic output.
pub trait DiagnosticsSink {
    /// Emit one line (without trailing newline).
    fn emit(&self, line: &str);
}

impl<F> DiagnosticsSink for F
where
    F: Fn(&str),
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

/// Sink forwarding every line to `tracing` at `INFO`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!(target: "confmap::diagnostics", "{line}");
    }
}

/// Sink collecting lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all lines emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Number of lines emitted so far
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Whether any emitted line contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(needle))
    }

    /// Drop all collected lines
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}
