//! Workflow definition types.
//!
//! A workflow is a named graph of typed nodes and directed edges, as saved by
//! the visual editor. Node and edge order is the order the editor declared
//! them in; the engine relies on it wherever it needs a stable tie-break.

use crate::edge::Edge;
use crate::node::{Node, NodeId, NodeKind};
use serde::{Deserialize, Deserializer, Serialize};
use stackflow_core::WorkflowId;

/// Length of a ULID in its text form.
const ULID_LEN: usize = 26;

/// A complete workflow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Unique identifier for this workflow.
    ///
    /// Definitions saved with a sequential integer key keep that key; see
    /// [`WorkflowId::from_number`].
    #[serde(default, deserialize_with = "stored_id")]
    pub id: WorkflowId,
    /// Human-readable name.
    pub name: String,
    /// Description of what this workflow does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this workflow is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Nodes in declaration order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Edges in declaration order.
    #[serde(default)]
    pub edges: Vec<Edge>,
}

fn default_active() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Key(u64),
    Text(String),
}

/// Reads an ID written as an integer key, a numeric string, or a ULID.
fn stored_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<WorkflowId, D::Error> {
    match StoredId::deserialize(deserializer)? {
        StoredId::Key(key) => Ok(WorkflowId::from_number(key)),
        StoredId::Text(text) => {
            let text = text.trim();
            match text.parse::<u64>() {
                Ok(key) if text.len() < ULID_LEN => Ok(WorkflowId::from_number(key)),
                _ => text.parse().map_err(serde::de::Error::custom),
            }
        }
    }
}

impl Workflow {
    /// Creates an empty workflow with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(WorkflowId::new(), name)
    }

    /// Creates an empty workflow with a specific ID.
    #[must_use]
    pub fn with_id(id: WorkflowId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            is_active: true,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a node.
    #[must_use]
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Appends an edge.
    #[must_use]
    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Parses a workflow from the editor's JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a workflow.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the first node with the given ID.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Returns the nodes of the given kind, in declaration order.
    pub fn nodes_of_kind<'a>(&'a self, kind: &'a NodeKind) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |n| &n.kind == kind)
    }

    /// Returns whether any node of the given kind exists.
    #[must_use]
    pub fn has_kind(&self, kind: &NodeKind) -> bool {
        self.nodes_of_kind(kind).next().is_some()
    }
}

/// Summary information about a workflow (for listings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSummary {
    /// Workflow ID.
    #[serde(deserialize_with = "stored_id")]
    pub id: WorkflowId,
    /// Workflow name.
    pub name: String,
    /// Description, if any.
    pub description: Option<String>,
    /// Whether active.
    pub is_active: bool,
    /// Number of nodes in the graph.
    pub node_count: usize,
    /// Number of edges in the graph.
    pub edge_count: usize,
}

impl From<&Workflow> for WorkflowSummary {
    fn from(workflow: &Workflow) -> Self {
        Self {
            id: workflow.id,
            name: workflow.name.clone(),
            description: workflow.description.clone(),
            is_active: workflow.is_active,
            node_count: workflow.nodes.len(),
            edge_count: workflow.edges.len(),
        }
    }
}
