//! Edge types for workflow graphs.
//!
//! An edge is a directed connection from one node to another, as drawn in the
//! editor. Edges carry no ports or payloads; they only shape the order in
//! which nodes are visited.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Editor-assigned edge ID, if any. Not used during execution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The upstream node.
    pub source: NodeId,
    /// The downstream node.
    pub target: NodeId,
}

impl Edge {
    /// Creates a new edge between two nodes.
    #[must_use]
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
        }
    }

    /// Sets the editor-assigned edge ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Returns true if this edge goes from `source` to `target`.
    #[must_use]
    pub fn connects(&self, source: &NodeId, target: &NodeId) -> bool {
        &self.source == source && &self.target == target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_parses_editor_shape() {
        let edge: Edge = serde_json::from_value(serde_json::json!({
            "id": "e1-2",
            "source": "1",
            "target": "2",
            "animated": true
        }))
        .expect("parse");

        assert_eq!(edge.id.as_deref(), Some("e1-2"));
        assert!(edge.connects(&NodeId::new("1"), &NodeId::new("2")));
        assert!(!edge.connects(&NodeId::new("2"), &NodeId::new("1")));
    }
}
