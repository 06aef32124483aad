//! Human-readable execution trace.
//!
//! Every significant step of a run appends one timestamped line. The trace is
//! returned to the caller with the run result; each line is also emitted as a
//! `tracing` event so operators see the same story in the service logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One line of the execution trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLogEntry {
    /// When the step was recorded.
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub message: String,
}

impl fmt::Display for ExecutionLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Append-only trace for a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionLog {
    entries: Vec<ExecutionLogEntry>,
}

impl ExecutionLog {
    /// Creates an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line stamped with the current time.
    pub fn record(&mut self, message: impl Into<String>) {
        let entry = ExecutionLogEntry {
            timestamp: Utc::now(),
            message: message.into(),
        };
        tracing::debug!(target: "stackflow::trace", "{}", entry.message);
        self.entries.push(entry);
    }

    /// Returns the recorded lines in order.
    #[must_use]
    pub fn entries(&self) -> &[ExecutionLogEntry] {
        &self.entries
    }

    /// Returns the recorded messages without timestamps.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    /// Returns the number of recorded lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the trace, returning its lines.
    #[must_use]
    pub fn into_entries(self) -> Vec<ExecutionLogEntry> {
        self.entries
    }
}

/// Shortens `text` to at most `max_chars` characters, marking the cut with `...`.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
