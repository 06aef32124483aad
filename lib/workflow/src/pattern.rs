//! Pipeline shape classification.
//!
//! The pattern is a diagnostic label for which canonical pipeline a workflow
//! resembles. It is computed once per run and never influences the order or
//! the dispatch of nodes.

use crate::definition::Workflow;
use crate::graph::AdjacencyGraph;
use crate::node::NodeKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The canonical shape a workflow resembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pattern {
    /// All four kinds, query routed through the knowledge base only.
    #[serde(rename = "Full RAG Pipeline")]
    FullRag,
    /// All four kinds, query wired to both the knowledge base and the LLM.
    #[serde(rename = "Hybrid Pipeline")]
    Hybrid,
    /// All four kinds, query wired straight to the LLM.
    #[serde(rename = "Direct LLM Pipeline")]
    DirectLlm,
    /// Query, LLM and output without a knowledge base.
    #[serde(rename = "Simple LLM Pipeline")]
    SimpleLlm,
    /// Anything else.
    #[serde(rename = "Custom Pipeline")]
    Custom,
}

impl Pattern {
    /// Returns the pattern label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullRag => "Full RAG Pipeline",
            Self::Hybrid => "Hybrid Pipeline",
            Self::DirectLlm => "Direct LLM Pipeline",
            Self::SimpleLlm => "Simple LLM Pipeline",
            Self::Custom => "Custom Pipeline",
        }
    }

    /// Returns the data flow this pattern stands for, if it has a fixed one.
    #[must_use]
    pub fn shape(&self) -> Option<&'static str> {
        match self {
            Self::FullRag => Some("UserQuery → KnowledgeBase → LLM → Output"),
            Self::Hybrid => Some("UserQuery → KnowledgeBase + LLM → Output"),
            Self::DirectLlm | Self::SimpleLlm => Some("UserQuery → LLM → Output"),
            Self::Custom => None,
        }
    }

    /// Classifies a workflow from its node kinds and the edges leaving its
    /// UserQuery nodes.
    #[must_use]
    pub fn classify(workflow: &Workflow, graph: &AdjacencyGraph) -> Self {
        let has_query = workflow.has_kind(&NodeKind::UserQuery);
        let has_knowledge = workflow.has_kind(&NodeKind::KnowledgeBase);
        let has_llm = workflow.has_kind(&NodeKind::LlmEngine);
        let has_output = workflow.has_kind(&NodeKind::Output);

        let query_feeds = |kind: &NodeKind| {
            workflow
                .nodes_of_kind(&NodeKind::UserQuery)
                .any(|query| {
                    workflow
                        .nodes_of_kind(kind)
                        .any(|target| graph.has_edge(&query.id, &target.id))
                })
        };
        let direct_to_llm = query_feeds(&NodeKind::LlmEngine);
        let through_knowledge = query_feeds(&NodeKind::KnowledgeBase);

        if has_query && has_knowledge && has_llm && has_output {
            match (through_knowledge, direct_to_llm) {
                (true, false) => Self::FullRag,
                (true, true) => Self::Hybrid,
                (false, true) => Self::DirectLlm,
                (false, false) => Self::Custom,
            }
        } else if has_query && has_llm && has_output {
            Self::SimpleLlm
        } else {
            Self::Custom
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shape() {
            Some(shape) => write!(f, "{} ({shape})", self.label()),
            None => f.write_str(self.label()),
        }
    }
}
