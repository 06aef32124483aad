//! Pipeline engine for stackflow.
//!
//! This crate runs workflows built in the visual editor: small graphs of
//! UserQuery, KnowledgeBase, LLM Engine and Output nodes. It provides:
//!
//! - **Definitions**: workflows, nodes and edges in the editor's JSON shape
//! - **Graph**: a petgraph adjacency view with declaration-ordered edges
//! - **Ordering**: depth-first visitation from the UserQuery entry point
//! - **Patterns**: classification into the canonical pipeline shapes
//! - **Execution**: per-kind node dispatch against injected collaborators,
//!   with a timestamped trace of every step
//! - **Service**: execute, validate and chat over a workflow store

pub mod collaborator;
pub mod config;
pub mod definition;
pub mod dispatcher;
pub mod edge;
pub mod error;
pub mod executor;
pub mod graph;
pub mod log;
pub mod mock;
pub mod node;
pub mod order;
pub mod pattern;
pub mod run_state;
pub mod service;

pub use collaborator::{
    CollaboratorError, ContextRetriever, DocumentIngestor, GenerationRequest, IngestRequest,
    ResponseGenerator, RetrievalRequest,
};
pub use config::EngineConfig;
pub use definition::{Workflow, WorkflowSummary};
pub use dispatcher::NodeDispatcher;
pub use edge::Edge;
pub use error::{ExecutionError, GraphError, NodeError};
pub use executor::{ExecutionResult, WorkflowExecutor};
pub use graph::AdjacencyGraph;
pub use log::{ExecutionLog, ExecutionLogEntry};
pub use node::{Node, NodeConfig, NodeData, NodeId, NodeKind};
pub use order::resolve_order;
pub use pattern::Pattern;
pub use run_state::{FinalOutput, OutputMetadata, RunState};
pub use service::{
    ChatReply, InMemoryWorkflowStore, ServiceError, StoreError, ValidationReport,
    WorkflowService, WorkflowStore,
};
