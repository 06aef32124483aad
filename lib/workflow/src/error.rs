//! Error types for the workflow crate.
//!
//! Errors come in two tiers:
//! - `NodeError`: a single node failed; the run logs it and moves on
//! - `ExecutionError`: the run itself cannot proceed (wraps `GraphError`)
//!
//! Store and service boundaries wrap these in rootcause reports.

use crate::node::NodeId;
use std::fmt;

/// Errors from building the execution graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two nodes share the same ID.
    DuplicateNode { node_id: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode { node_id } => {
                write!(f, "duplicate node id: {node_id}")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// A failure confined to one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A configuration value could not be interpreted.
    InvalidConfig { key: String, reason: String },
    /// The context retrieval collaborator raised.
    RetrievalFailed { reason: String },
    /// The generation collaborator raised.
    GenerationFailed { reason: String },
    /// The generation collaborator answered with an error response.
    GenerationRejected { response: String },
    /// The node kind is not one this engine can execute.
    UnknownKind { kind: String },
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { key, reason } => {
                write!(f, "invalid config '{key}': {reason}")
            }
            Self::RetrievalFailed { reason } => {
                write!(f, "knowledge base error: {reason}")
            }
            Self::GenerationFailed { reason } => write!(f, "LLM engine error: {reason}"),
            Self::GenerationRejected { response } => write!(f, "LLM error: {response}"),
            Self::UnknownKind { kind } => write!(f, "unknown node type: {kind}"),
        }
    }
}

impl std::error::Error for NodeError {}

/// Errors that abort a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    /// The execution graph could not be built.
    Graph(GraphError),
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graph(e) => write!(f, "graph construction failed: {e}"),
        }
    }
}

impl std::error::Error for ExecutionError {}

impl From<GraphError> for ExecutionError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::DuplicateNode {
            node_id: NodeId::new("kb-1"),
        };
        assert_eq!(err.to_string(), "duplicate node id: kb-1");
    }

    #[test]
    fn node_error_display() {
        let err = NodeError::GenerationRejected {
            response: "Error: API key is required".to_string(),
        };
        assert!(err.to_string().starts_with("LLM error: Error:"));

        let err = NodeError::UnknownKind {
            kind: "webSearch".to_string(),
        };
        assert!(err.to_string().contains("webSearch"));
    }

    #[test]
    fn execution_error_wraps_graph_error() {
        let err: ExecutionError = GraphError::DuplicateNode {
            node_id: NodeId::new("1"),
        }
        .into();
        assert!(err.to_string().contains("duplicate node id: 1"));
    }
}
