//! Workflow execution.
//!
//! The executor drives a single run end to end:
//!
//! 1. Initialise the run state from the user input
//! 2. Build the adjacency graph and classify the pipeline pattern
//! 3. Resolve the visitation order
//! 4. Dispatch each node in turn, recording which ones succeed
//! 5. Assemble an [`ExecutionResult`]
//!
//! Node failures never stop a run. Only run-fatal errors (duplicate node IDs)
//! end it early, and those are turned into a failed result carrying the
//! trace recorded so far. A workflow without nodes runs to completion with
//! nothing to do.

use crate::definition::Workflow;
use crate::dispatcher::NodeDispatcher;
use crate::error::ExecutionError;
use crate::graph::AdjacencyGraph;
use crate::log::{ExecutionLog, ExecutionLogEntry};
use crate::node::NodeId;
use crate::order::resolve_order;
use crate::pattern::Pattern;
use crate::run_state::{FinalOutput, RunState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stackflow_core::{WorkflowId, WorkflowRunId};
use tracing::{error, info, instrument};

/// Final response reported when no Output node produced one.
pub const NO_RESPONSE: &str = "No response generated";

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Identifier of this run.
    pub run_id: WorkflowRunId,
    /// False only when the run could not be carried out at all.
    pub success: bool,
    pub workflow_id: WorkflowId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_name: Option<String>,
    /// The input as received, before any preprocessing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_response: Option<FinalOutput>,
    #[serde(default)]
    pub context_used: bool,
    #[serde(default)]
    pub knowledge_processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,
    /// Number of nodes that completed successfully.
    #[serde(default)]
    pub nodes_executed: usize,
    /// Nodes that completed successfully, in execution order.
    #[serde(default)]
    pub executed_node_ids: Vec<NodeId>,
    pub execution_log: Vec<ExecutionLogEntry>,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// Creates a failed result.
    #[must_use]
    pub fn failure(
        workflow_id: WorkflowId,
        error: impl Into<String>,
        execution_log: Vec<ExecutionLogEntry>,
    ) -> Self {
        Self {
            run_id: WorkflowRunId::new(),
            success: false,
            workflow_id,
            workflow_name: None,
            user_query: None,
            final_response: None,
            context_used: false,
            knowledge_processed: false,
            pattern: None,
            nodes_executed: 0,
            executed_node_ids: Vec::new(),
            execution_log,
            timestamp: Utc::now(),
            error: Some(error.into()),
        }
    }

    /// Returns the final response text, if there is one.
    #[must_use]
    pub fn response_text(&self) -> Option<&str> {
        self.final_response.as_ref().map(FinalOutput::response)
    }

    /// Returns the trace rendered as `[HH:MM:SS] message` lines.
    #[must_use]
    pub fn log_lines(&self) -> Vec<String> {
        self.execution_log.iter().map(ToString::to_string).collect()
    }
}

/// What a run that was not cut short leaves behind.
struct CompletedRun {
    state: RunState,
    pattern: Pattern,
}

/// Runs workflows against a node dispatcher.
///
/// The executor holds no per-run state, so one instance can serve any number
/// of concurrent runs.
#[derive(Clone)]
pub struct WorkflowExecutor {
    dispatcher: NodeDispatcher,
}

impl WorkflowExecutor {
    /// Creates an executor.
    pub fn new(dispatcher: NodeDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Returns the dispatcher used for nodes.
    #[must_use]
    pub fn dispatcher(&self) -> &NodeDispatcher {
        &self.dispatcher
    }

    /// Executes `workflow` with `user_input` as the query.
    ///
    /// Always returns a result; run-fatal errors are reported through
    /// `success` and `error`.
    #[instrument(skip_all, fields(workflow_id = %workflow.id, workflow_name = %workflow.name))]
    pub async fn execute(&self, workflow: &Workflow, user_input: &str) -> ExecutionResult {
        let mut log = ExecutionLog::new();

        match self.run(workflow, user_input, &mut log).await {
            Ok(CompletedRun { state, pattern }) => {
                info!(
                    pattern = pattern.label(),
                    nodes_executed = state.executed_node_ids.len(),
                    "workflow run finished"
                );
                ExecutionResult {
                    run_id: WorkflowRunId::new(),
                    success: true,
                    workflow_id: workflow.id,
                    workflow_name: Some(workflow.name.clone()),
                    user_query: Some(user_input.to_string()),
                    context_used: state.context_used(),
                    knowledge_processed: state.knowledge_processed,
                    final_response: Some(
                        state
                            .final_output
                            .unwrap_or_else(|| FinalOutput::Text(NO_RESPONSE.to_string())),
                    ),
                    pattern: Some(pattern),
                    nodes_executed: state.executed_node_ids.len(),
                    executed_node_ids: state.executed_node_ids,
                    execution_log: log.into_entries(),
                    timestamp: Utc::now(),
                    error: None,
                }
            }
            Err(e) => {
                error!(error = %e, "workflow run aborted");
                log.record(format!("Execution failed: {e}"));
                ExecutionResult::failure(workflow.id, e.to_string(), log.into_entries())
            }
        }
    }

    async fn run(
        &self,
        workflow: &Workflow,
        user_input: &str,
        log: &mut ExecutionLog,
    ) -> Result<CompletedRun, ExecutionError> {
        log.record(format!("Starting workflow: {}", workflow.name));
        log.record(format!("User input: {user_input}"));

        let mut state = RunState::new(user_input);
        let graph = AdjacencyGraph::from_workflow(workflow)?;

        let pattern = Pattern::classify(workflow, &graph);
        log.record(format!("Detected pattern: {pattern}"));

        let order = resolve_order(workflow, &graph);
        let labels: Vec<&str> = order
            .iter()
            .filter_map(|id| workflow.node(id))
            .map(|node| node.display_label())
            .collect();
        log.record(format!("Execution order: [{}]", labels.join(", ")));

        for node_id in &order {
            let Some(node) = workflow.node(node_id) else {
                continue;
            };
            let label = node.display_label();
            log.record(format!("Executing: {label} ({})", node.kind));

            match self.dispatcher.execute_node(node, &mut state, log).await {
                Ok(()) => {
                    state.executed_node_ids.push(node.id.clone());
                    log.record(format!("{label} completed successfully"));
                }
                Err(e) => {
                    info!(node_id = %node.id, error = %e, "node failed");
                    log.record(format!("{label} failed, continuing with workflow..."));
                }
            }
        }

        Ok(CompletedRun { state, pattern })
    }
}
