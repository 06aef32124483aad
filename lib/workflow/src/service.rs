//! Request handling for stored workflows.
//!
//! `WorkflowService` is the entry point a transport layer calls: it looks a
//! workflow up in a [`WorkflowStore`] and runs it, either as a plain
//! execution, as a validation pass, or as one chat turn.

use crate::definition::{Workflow, WorkflowSummary};
use crate::executor::{ExecutionResult, NO_RESPONSE, WorkflowExecutor};
use crate::log::ExecutionLogEntry;
use crate::pattern::Pattern;
use crate::run_state::FinalOutput;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use stackflow_core::{Result, WorkflowId};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Query used when validating a workflow by running it.
pub const VALIDATION_QUERY: &str = "Test validation query";

/// Errors from workflow storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached.
    Unavailable { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "workflow store unavailable: {reason}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors returned to callers of [`WorkflowService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No workflow has the requested ID.
    NotFound { workflow_id: WorkflowId },
    /// The run could not be carried out.
    RunFailed { reason: String },
    /// The store failed.
    Store,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { workflow_id } => write!(f, "Workflow {workflow_id} not found"),
            Self::RunFailed { reason } => f.write_str(reason),
            Self::Store => write!(f, "workflow store error"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Persistence for workflow definitions.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Loads a workflow by ID.
    async fn get(&self, id: WorkflowId) -> Result<Option<Workflow>, StoreError>;

    /// Inserts or replaces a workflow.
    async fn save(&self, workflow: Workflow) -> Result<(), StoreError>;

    /// Lists stored workflows.
    async fn list(&self) -> Result<Vec<WorkflowSummary>, StoreError>;
}

/// A workflow store held in memory.
#[derive(Debug, Default)]
pub struct InMemoryWorkflowStore {
    workflows: RwLock<HashMap<WorkflowId, Workflow>>,
}

impl InMemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for InMemoryWorkflowStore {
    async fn get(&self, id: WorkflowId) -> Result<Option<Workflow>, StoreError> {
        Ok(self.workflows.read().await.get(&id).cloned())
    }

    async fn save(&self, workflow: Workflow) -> Result<(), StoreError> {
        self.workflows.write().await.insert(workflow.id, workflow);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<WorkflowSummary>, StoreError> {
        let workflows = self.workflows.read().await;
        let mut summaries: Vec<WorkflowSummary> =
            workflows.values().map(WorkflowSummary::from).collect();
        summaries.sort_by_key(|s| s.id.as_ulid());
        Ok(summaries)
    }
}

/// Outcome of validating a workflow by running it once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub workflow_id: WorkflowId,
    pub pattern: Option<Pattern>,
    /// Nodes that completed during the validation run.
    pub nodes_count: usize,
    pub errors: Vec<String>,
    pub message: String,
}

/// One chat turn answered by a workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: FinalOutput,
    pub workflow_id: WorkflowId,
    pub query: String,
    pub context_used: bool,
    pub timestamp: DateTime<Utc>,
    pub execution_log: Vec<ExecutionLogEntry>,
}

/// Runs stored workflows.
pub struct WorkflowService<S: WorkflowStore> {
    store: S,
    executor: WorkflowExecutor,
}

impl<S: WorkflowStore> WorkflowService<S> {
    /// Creates a service over `store`.
    pub fn new(store: S, executor: WorkflowExecutor) -> Self {
        Self { store, executor }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a workflow definition.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown IDs and
    /// [`ServiceError::Store`] if the store fails.
    pub async fn workflow(&self, id: WorkflowId) -> Result<Workflow, ServiceError> {
        let found = self
            .store
            .get(id)
            .await
            .map_err(|report| report.context(ServiceError::Store))?;
        found.ok_or_else(|| Report::new(ServiceError::NotFound { workflow_id: id }))
    }

    /// Runs a stored workflow with `user_input`.
    ///
    /// Lookup failures and empty workflows come back as failed results, the
    /// same way run-fatal errors do.
    #[instrument(skip(self, user_input))]
    pub async fn execute(&self, id: WorkflowId, user_input: &str) -> ExecutionResult {
        let workflow = match self.workflow(id).await {
            Ok(workflow) => workflow,
            Err(report) => {
                debug!(error = %report, "workflow lookup failed");
                let reason = match report.current_context() {
                    ServiceError::NotFound { .. } => report.current_context().to_string(),
                    _ => format!("Execution failed: {report}"),
                };
                return ExecutionResult::failure(id, reason, Vec::new());
            }
        };

        if workflow.nodes.is_empty() {
            return ExecutionResult::failure(id, "Workflow has no nodes to execute", Vec::new());
        }

        self.executor.execute(&workflow, user_input).await
    }

    /// Checks a stored workflow by running it with a fixed test query.
    pub async fn validate(&self, id: WorkflowId) -> ValidationReport {
        let result = self.execute(id, VALIDATION_QUERY).await;

        if result.success {
            ValidationReport {
                valid: true,
                workflow_id: id,
                pattern: result.pattern,
                nodes_count: result.nodes_executed,
                errors: Vec::new(),
                message: "Workflow is valid and ready to execute".to_string(),
            }
        } else {
            ValidationReport {
                valid: false,
                workflow_id: id,
                pattern: result.pattern,
                nodes_count: result.nodes_executed,
                errors: vec![result.error.unwrap_or_else(|| "Unknown error".to_string())],
                message: "Workflow has validation errors".to_string(),
            }
        }
    }

    /// Answers one chat message with a stored workflow.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::RunFailed`] if the run could not be carried out.
    pub async fn chat(&self, id: WorkflowId, query: &str) -> Result<ChatReply, ServiceError> {
        let result = self.execute(id, query).await;

        if !result.success {
            let reason = result
                .error
                .unwrap_or_else(|| "Chat execution failed".to_string());
            return Err(Report::new(ServiceError::RunFailed { reason }));
        }

        Ok(ChatReply {
            message: result
                .final_response
                .unwrap_or_else(|| FinalOutput::Text(NO_RESPONSE.to_string())),
            workflow_id: id,
            query: query.to_string(),
            context_used: result.context_used,
            timestamp: result.timestamp,
            execution_log: result.execution_log,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::dispatcher::NodeDispatcher;
    use crate::edge::Edge;
    use crate::mock::{MockGenerator, MockIngestor, MockRetriever};
    use crate::node::{Node, NodeKind};
    use std::sync::Arc;

    /// A store that is always down.
    struct BrokenStore;

    #[async_trait]
    impl WorkflowStore for BrokenStore {
        async fn get(&self, _id: WorkflowId) -> Result<Option<Workflow>, StoreError> {
            Err(Report::new(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            }))
        }

        async fn save(&self, _workflow: Workflow) -> Result<(), StoreError> {
            Err(Report::new(StoreError::Unavailable {
                reason: "connection refused".to_string(),
            }))
        }

        async fn list(&self) -> Result<Vec<WorkflowSummary>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn executor() -> WorkflowExecutor {
        WorkflowExecutor::new(NodeDispatcher::new(
            Arc::new(MockIngestor::new()),
            Arc::new(MockRetriever::empty()),
            Arc::new(MockGenerator::responding("Hello from the model.")),
            EngineConfig::default(),
        ))
    }

    fn simple_workflow() -> Workflow {
        Workflow::new("Simple chat")
            .with_node(Node::new("q", NodeKind::UserQuery))
            .with_node(Node::new("llm", NodeKind::LlmEngine))
            .with_node(Node::new("out", NodeKind::Output))
            .with_edge(Edge::new("q", "llm"))
            .with_edge(Edge::new("llm", "out"))
    }

    async fn service_with(workflows: Vec<Workflow>) -> WorkflowService<InMemoryWorkflowStore> {
        let store = InMemoryWorkflowStore::new();
        for workflow in workflows {
            store.save(workflow).await.expect("save");
        }
        WorkflowService::new(store, executor())
    }

    #[tokio::test]
    async fn execute_runs_stored_workflow() {
        let workflow = simple_workflow();
        let id = workflow.id;
        let service = service_with(vec![workflow]).await;

        let result = service.execute(id, "hi").await;

        assert!(result.success);
        assert_eq!(result.response_text(), Some("Hello from the model."));
    }

    #[tokio::test]
    async fn execute_unknown_workflow_fails() {
        let service = service_with(Vec::new()).await;
        let id = WorkflowId::new();

        let result = service.execute(id, "hi").await;

        assert!(!result.success);
        assert_eq!(result.error, Some(format!("Workflow {id} not found")));
        assert!(result.execution_log.is_empty());
    }

    #[tokio::test]
    async fn execute_empty_workflow_fails() {
        let workflow = Workflow::new("Empty");
        let id = workflow.id;
        let service = service_with(vec![workflow]).await;

        let result = service.execute(id, "hi").await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Workflow has no nodes to execute"));
    }

    #[tokio::test]
    async fn execute_reports_store_failure() {
        let service = WorkflowService::new(BrokenStore, executor());

        let result = service.execute(WorkflowId::new(), "hi").await;

        assert!(!result.success);
        assert!(
            result
                .error
                .as_deref()
                .is_some_and(|e| e.starts_with("Execution failed:"))
        );
    }

    #[tokio::test]
    async fn validate_reports_valid_workflow() {
        let workflow = simple_workflow();
        let id = workflow.id;
        let service = service_with(vec![workflow]).await;

        let report = service.validate(id).await;

        assert!(report.valid);
        assert_eq!(report.pattern, Some(Pattern::SimpleLlm));
        assert_eq!(report.nodes_count, 3);
        assert!(report.errors.is_empty());
        assert_eq!(report.message, "Workflow is valid and ready to execute");
    }

    #[tokio::test]
    async fn validate_reports_errors() {
        let service = service_with(Vec::new()).await;
        let id = WorkflowId::new();

        let report = service.validate(id).await;

        assert!(!report.valid);
        assert_eq!(report.errors, vec![format!("Workflow {id} not found")]);
        assert_eq!(report.message, "Workflow has validation errors");
    }

    #[tokio::test]
    async fn chat_returns_reply() {
        let workflow = simple_workflow();
        let id = workflow.id;
        let service = service_with(vec![workflow]).await;

        let reply = service.chat(id, "hello?").await.expect("chat");

        assert_eq!(reply.message, FinalOutput::Text("Hello from the model.".to_string()));
        assert_eq!(reply.query, "hello?");
        assert!(!reply.context_used);
        assert!(!reply.execution_log.is_empty());
    }

    #[tokio::test]
    async fn chat_fails_for_empty_workflow() {
        let workflow = Workflow::new("Empty");
        let id = workflow.id;
        let service = service_with(vec![workflow]).await;

        let err = service.chat(id, "hello?").await.unwrap_err();

        assert_eq!(
            err.current_context(),
            &ServiceError::RunFailed {
                reason: "Workflow has no nodes to execute".to_string()
            }
        );
    }

    #[tokio::test]
    async fn workflow_lookup_distinguishes_missing() {
        let service = service_with(Vec::new()).await;
        let id = WorkflowId::new();

        let err = service.workflow(id).await.unwrap_err();

        assert_eq!(err.current_context(), &ServiceError::NotFound { workflow_id: id });
    }

    #[tokio::test]
    async fn in_memory_store_lists_summaries() {
        let first = simple_workflow();
        let second = Workflow::new("Other");
        let service = service_with(vec![first.clone(), second.clone()]).await;

        let summaries = service.store().list().await.expect("list");

        assert_eq!(summaries.len(), 2);
        assert!(summaries.iter().any(|s| s.id == first.id && s.node_count == 3));
        assert!(summaries.iter().any(|s| s.id == second.id && s.node_count == 0));
    }
}
