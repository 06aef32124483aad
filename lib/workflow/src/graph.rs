//! Adjacency graph derived from a workflow's edges.
//!
//! The graph is rebuilt for every run and never persisted. Edges that point
//! at unknown nodes are dropped, since half-drawn connections are routine in
//! the editor. Targets of a node keep the order their edges were declared in.

use crate::definition::Workflow;
use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::{Node, NodeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use tracing::debug;

/// Directed adjacency structure over a workflow's node IDs.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    /// The underlying directed graph; node weights are node IDs.
    graph: DiGraph<NodeId, ()>,
    /// Map from NodeId to petgraph's NodeIndex for O(1) lookup.
    node_index_map: HashMap<NodeId, NodeIndex>,
}

impl AdjacencyGraph {
    /// Builds the graph for a workflow.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if two nodes share an ID.
    pub fn from_workflow(workflow: &Workflow) -> Result<Self, GraphError> {
        Self::build(&workflow.nodes, &workflow.edges)
    }

    /// Builds the graph from nodes and edges.
    ///
    /// Every node gets an entry, even with no outgoing edges. Edges whose
    /// source or target is not a known node are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if two nodes share an ID.
    pub fn build(nodes: &[Node], edges: &[Edge]) -> Result<Self, GraphError> {
        let mut graph = DiGraph::with_capacity(nodes.len(), edges.len());
        let mut node_index_map = HashMap::with_capacity(nodes.len());

        for node in nodes {
            if node_index_map.contains_key(&node.id) {
                return Err(GraphError::DuplicateNode {
                    node_id: node.id.clone(),
                });
            }
            let index = graph.add_node(node.id.clone());
            node_index_map.insert(node.id.clone(), index);
        }

        for edge in edges {
            let (Some(&source), Some(&target)) = (
                node_index_map.get(&edge.source),
                node_index_map.get(&edge.target),
            ) else {
                debug!(source = %edge.source, target = %edge.target, "skipping dangling edge");
                continue;
            };
            graph.add_edge(source, target, ());
        }

        Ok(Self {
            graph,
            node_index_map,
        })
    }

    /// Returns true if the graph has a node with this ID.
    #[must_use]
    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.node_index_map.contains_key(node_id)
    }

    /// Returns all node IDs in declaration order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.graph.node_weights()
    }

    /// Returns the targets of a node's outgoing edges, in edge declaration order.
    ///
    /// Unknown nodes have no targets.
    #[must_use]
    pub fn targets(&self, node_id: &NodeId) -> Vec<&NodeId> {
        let Some(&index) = self.node_index_map.get(node_id) else {
            return Vec::new();
        };

        let mut outgoing: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .collect();
        outgoing.sort_by_key(|edge| edge.id());

        outgoing
            .into_iter()
            .filter_map(|edge| self.graph.node_weight(edge.target()))
            .collect()
    }

    /// Returns true if a direct edge goes from `source` to `target`.
    #[must_use]
    pub fn has_edge(&self, source: &NodeId, target: &NodeId) -> bool {
        match (
            self.node_index_map.get(source),
            self.node_index_map.get(target),
        ) {
            (Some(&s), Some(&t)) => self.graph.contains_edge(s, t),
            _ => false,
        }
    }

    /// Returns the full adjacency listing in node declaration order.
    #[must_use]
    pub fn adjacency(&self) -> Vec<(&NodeId, Vec<&NodeId>)> {
        self.node_ids().map(|id| (id, self.targets(id))).collect()
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges kept in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
