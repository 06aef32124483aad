//! Error types for the AI crate.
//!
//! - `LlmError`: failed generation calls
//! - `PromptError`: prompt template rendering

use std::fmt;

/// Errors a backend reports when a generation call fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// The provider answered with a failure status.
    RequestFailed { status: Option<u16>, reason: String },
    /// No answer arrived in time.
    Timeout,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed {
                status: Some(status),
                reason,
            } => write!(f, "LLM request failed with status {status}: {reason}"),
            Self::RequestFailed { status: None, reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::Timeout => write!(f, "LLM request timed out"),
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    /// A placeholder in the template has no value.
    MissingVariable { variable: String },
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVariable { variable } => {
                write!(f, "prompt variable '{variable}' has no value")
            }
        }
    }
}

impl std::error::Error for PromptError {}
