//! Visitation order for a run.
//!
//! Starting from the UserQuery node, nodes are listed in depth-first
//! pre-order along the adjacency graph. This is a discovery order, not a
//! topological sort: a node reached early through one edge may run before
//! another of its predecessors. Nodes the walk never reaches are appended in
//! declaration order, so a declared node is never silently dropped.
//!
//! Without a UserQuery node there is no entry point, and nodes are listed by
//! kind priority instead.

use crate::definition::Workflow;
use crate::graph::AdjacencyGraph;
use crate::node::{NodeId, NodeKind};
use std::collections::HashSet;

/// Computes the order in which a run visits the workflow's nodes.
#[must_use]
pub fn resolve_order(workflow: &Workflow, graph: &AdjacencyGraph) -> Vec<NodeId> {
    match workflow.nodes_of_kind(&NodeKind::UserQuery).next() {
        Some(entry) => depth_first_order(workflow, graph, &entry.id),
        None => priority_order(workflow),
    }
}

/// Pre-order walk from `entry`, then every unreached node.
fn depth_first_order(workflow: &Workflow, graph: &AdjacencyGraph, entry: &NodeId) -> Vec<NodeId> {
    let mut visited: HashSet<&NodeId> = HashSet::with_capacity(workflow.nodes.len());
    let mut order = Vec::with_capacity(workflow.nodes.len());
    let mut stack = vec![entry];

    while let Some(node_id) = stack.pop() {
        if !graph.contains(node_id) || !visited.insert(node_id) {
            continue;
        }
        order.push(node_id.clone());
        // Reversed so the first declared target is popped first, matching
        // the recursive formulation.
        stack.extend(graph.targets(node_id).into_iter().rev());
    }

    for node in &workflow.nodes {
        if visited.insert(&node.id) {
            order.push(node.id.clone());
        }
    }

    order
}

/// All UserQuery nodes, then KnowledgeBase, LLM Engine, and Output nodes.
///
/// Nodes of any other kind are left out.
fn priority_order(workflow: &Workflow) -> Vec<NodeId> {
    NodeKind::PRIORITY
        .iter()
        .flat_map(|kind| workflow.nodes_of_kind(kind))
        .map(|node| node.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::node::Node;

    fn order_of(workflow: &Workflow) -> Vec<String> {
        let graph = AdjacencyGraph::from_workflow(workflow).expect("build");
        resolve_order(workflow, &graph)
            .into_iter()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    fn assert_each_node_once(workflow: &Workflow) {
        let mut order = order_of(workflow);
        let mut declared: Vec<String> = workflow
            .nodes
            .iter()
            .map(|n| n.id.as_str().to_string())
            .collect();
        order.sort();
        declared.sort();
        assert_eq!(order, declared);
    }

    fn rag_workflow() -> Workflow {
        Workflow::new("rag")
            .with_node(Node::new("out", NodeKind::Output))
            .with_node(Node::new("llm", NodeKind::LlmEngine))
            .with_node(Node::new("kb", NodeKind::KnowledgeBase))
            .with_node(Node::new("q", NodeKind::UserQuery))
            .with_edge(Edge::new("q", "kb"))
            .with_edge(Edge::new("kb", "llm"))
            .with_edge(Edge::new("llm", "out"))
    }

    #[test]
    fn follows_edges_from_user_query() {
        assert_eq!(order_of(&rag_workflow()), vec!["q", "kb", "llm", "out"]);
    }

    #[test]
    fn pre_order_descends_before_siblings() {
        // q -> a -> c, q -> b; a's subtree is finished before b.
        let workflow = Workflow::new("tree")
            .with_node(Node::new("q", NodeKind::UserQuery))
            .with_node(Node::new("a", NodeKind::KnowledgeBase))
            .with_node(Node::new("b", NodeKind::LlmEngine))
            .with_node(Node::new("c", NodeKind::Output))
            .with_edge(Edge::new("q", "a"))
            .with_edge(Edge::new("q", "b"))
            .with_edge(Edge::new("a", "c"));

        assert_eq!(order_of(&workflow), vec!["q", "a", "c", "b"]);
    }

    #[test]
    fn discovery_order_can_precede_predecessors() {
        // Hybrid shape: q -> llm directly, and q -> kb -> llm. The llm node
        // is discovered through the first edge, before kb runs.
        let workflow = Workflow::new("hybrid")
            .with_node(Node::new("q", NodeKind::UserQuery))
            .with_node(Node::new("kb", NodeKind::KnowledgeBase))
            .with_node(Node::new("llm", NodeKind::LlmEngine))
            .with_node(Node::new("out", NodeKind::Output))
            .with_edge(Edge::new("q", "llm"))
            .with_edge(Edge::new("q", "kb"))
            .with_edge(Edge::new("kb", "llm"))
            .with_edge(Edge::new("llm", "out"));

        assert_eq!(order_of(&workflow), vec!["q", "llm", "out", "kb"]);
    }

    #[test]
    fn unreached_nodes_follow_in_declaration_order() {
        let workflow = Workflow::new("islands")
            .with_node(Node::new("x", NodeKind::Output))
            .with_node(Node::new("q", NodeKind::UserQuery))
            .with_node(Node::new("y", NodeKind::LlmEngine))
            .with_node(Node::new("z", NodeKind::KnowledgeBase))
            .with_edge(Edge::new("q", "z"));

        assert_eq!(order_of(&workflow), vec!["q", "z", "x", "y"]);
    }

    #[test]
    fn cycles_visit_each_node_once() {
        let workflow = Workflow::new("loop")
            .with_node(Node::new("q", NodeKind::UserQuery))
            .with_node(Node::new("a", NodeKind::LlmEngine))
            .with_node(Node::new("b", NodeKind::Output))
            .with_edge(Edge::new("q", "a"))
            .with_edge(Edge::new("a", "b"))
            .with_edge(Edge::new("b", "q"))
            .with_edge(Edge::new("b", "a"));

        assert_eq!(order_of(&workflow), vec!["q", "a", "b"]);
    }

    #[test]
    fn no_entry_falls_back_to_kind_priority() {
        let workflow = Workflow::new("headless")
            .with_node(Node::new("out", NodeKind::Output))
            .with_node(Node::new("llm-2", NodeKind::LlmEngine))
            .with_node(Node::new("custom", NodeKind::Unknown("webSearch".into())))
            .with_node(Node::new("kb", NodeKind::KnowledgeBase))
            .with_node(Node::new("llm-1", NodeKind::LlmEngine))
            .with_edge(Edge::new("out", "kb"));

        assert_eq!(order_of(&workflow), vec!["kb", "llm-2", "llm-1", "out"]);
    }

    #[test]
    fn first_declared_user_query_is_the_entry() {
        let workflow = Workflow::new("two entries")
            .with_node(Node::new("q2", NodeKind::UserQuery))
            .with_node(Node::new("q1", NodeKind::UserQuery))
            .with_node(Node::new("out", NodeKind::Output))
            .with_edge(Edge::new("q1", "out"));

        assert_eq!(order_of(&workflow), vec!["q2", "q1", "out"]);
    }

    #[test]
    fn every_shape_lists_each_node_once() {
        let kinds = [
            NodeKind::UserQuery,
            NodeKind::KnowledgeBase,
            NodeKind::LlmEngine,
            NodeKind::Output,
            NodeKind::Unknown("note".into()),
        ];

        // Deterministic pseudo-random graphs over 1..=8 nodes.
        let mut seed: u64 = 0x5eed;
        let mut next = move || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            (seed >> 33) as usize
        };

        for size in 1..=8 {
            for _ in 0..25 {
                let mut workflow = Workflow::new("random")
                    .with_node(Node::new("entry", NodeKind::UserQuery));
                for i in 1..size {
                    let kind = kinds[next() % kinds.len()].clone();
                    workflow = workflow.with_node(Node::new(format!("n{i}"), kind));
                }
                for _ in 0..next() % (size * 2 + 1) {
                    let source = workflow.nodes[next() % size].id.clone();
                    let target = workflow.nodes[next() % size].id.clone();
                    workflow = workflow.with_edge(Edge::new(source, target));
                }
                assert_each_node_once(&workflow);
            }
        }
    }
}
