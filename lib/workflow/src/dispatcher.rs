//! Per-kind node execution.
//!
//! The dispatcher reads a node's configuration, calls the matching
//! collaborator, and folds the outcome into the run state. A returned error
//! fails the node only; the executor logs it and moves on to the next node.

use crate::collaborator::{
    ContextRetriever, DocumentIngestor, GenerationRequest, IngestRequest, NO_CONTEXT_FOUND,
    ResponseGenerator, RetrievalRequest, is_error_response,
};
use crate::config::EngineConfig;
use crate::error::NodeError;
use crate::log::{ExecutionLog, preview};
use crate::node::{Node, NodeKind};
use crate::run_state::{FinalOutput, RunState};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Stored as the LLM response when generation returns nothing.
pub const EMPTY_RESPONSE_FALLBACK: &str =
    "I'm sorry, I couldn't generate a response to your query.";

/// Executes individual nodes against the injected collaborators.
#[derive(Clone)]
pub struct NodeDispatcher {
    ingestor: Arc<dyn DocumentIngestor>,
    retriever: Arc<dyn ContextRetriever>,
    generator: Arc<dyn ResponseGenerator>,
    config: EngineConfig,
}

impl NodeDispatcher {
    /// Creates a dispatcher.
    pub fn new(
        ingestor: Arc<dyn DocumentIngestor>,
        retriever: Arc<dyn ContextRetriever>,
        generator: Arc<dyn ResponseGenerator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            ingestor,
            retriever,
            generator,
            config,
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Executes one node, updating `state` and appending to `log`.
    ///
    /// # Errors
    ///
    /// Returns a [`NodeError`] if the node failed. The failure is local to the
    /// node; the state keeps whatever the node managed to record.
    #[instrument(skip_all, fields(node_id = %node.id, kind = %node.kind))]
    pub async fn execute_node(
        &self,
        node: &Node,
        state: &mut RunState,
        log: &mut ExecutionLog,
    ) -> Result<(), NodeError> {
        debug!(config_keys = ?node.config().keys().collect::<Vec<_>>(), "dispatching node");

        match &node.kind {
            NodeKind::UserQuery => {
                Self::run_user_query(node, state, log);
                Ok(())
            }
            NodeKind::KnowledgeBase => self.run_knowledge_base(node, state, log).await,
            NodeKind::LlmEngine => self.run_llm_engine(node, state, log).await,
            NodeKind::Output => {
                Self::run_output(node, state, log);
                Ok(())
            }
            NodeKind::Unknown(tag) => {
                warn!(kind = %tag, "skipping node of unknown kind");
                log.record(format!("Unknown node type: {tag}"));
                Err(NodeError::UnknownKind { kind: tag.clone() })
            }
        }
    }

    fn run_user_query(node: &Node, state: &mut RunState, log: &mut ExecutionLog) {
        log.record("Processing user query...");

        if node.config().flag("preprocess") {
            state.user_query = state.user_query.trim().to_lowercase();
            log.record(format!("Query preprocessed: {}", state.user_query));
        }

        log.record("User query processed successfully");
    }

    async fn run_knowledge_base(
        &self,
        node: &Node,
        state: &mut RunState,
        log: &mut ExecutionLog,
    ) -> Result<(), NodeError> {
        log.record("Processing knowledge base...");

        let config = node.config();
        let api_key = config.trimmed_text("api-key");
        let embedding_model = config
            .text("embedding-model")
            .unwrap_or(self.config.default_embedding_model.as_str());

        match api_key {
            Some(_) => log.record(format!(
                "Using provided API key for embeddings with model: {embedding_model}"
            )),
            None => log.record("No API key provided for knowledge base"),
        }

        let uploaded_files = config.list("uploadedFiles");
        if config.flag("hasFiles") && !uploaded_files.is_empty() {
            log.record(format!(
                "Processing {} uploaded documents...",
                uploaded_files.len()
            ));

            for file in uploaded_files {
                let Some(path) = file
                    .get("path")
                    .and_then(JsonValue::as_str)
                    .filter(|p| !p.is_empty())
                else {
                    continue;
                };
                let name = file
                    .get("name")
                    .and_then(JsonValue::as_str)
                    .unwrap_or("unknown");

                let request = IngestRequest {
                    path,
                    api_key,
                    embedding_model,
                };
                match self.ingestor.ingest(&request).await {
                    Ok(()) => log.record(format!("Successfully processed {name}")),
                    Err(e) => {
                        warn!(file = name, error = %e, "document ingestion failed");
                        log.record(format!("Failed to process {name}: {e}"));
                    }
                }
            }

            state.documents_uploaded = true;
            log.record("Documents processed and stored in vector database");
        }

        log.record(format!(
            "Searching for relevant context for: {}",
            state.user_query
        ));

        let retrieved = self
            .retriever
            .retrieve(&RetrievalRequest {
                query: &state.user_query,
                api_key,
                embedding_model,
                k: self.config.retrieval_k,
            })
            .await;

        let context = match retrieved {
            Ok(context) => context,
            Err(e) => {
                let error = NodeError::RetrievalFailed {
                    reason: e.to_string(),
                };
                log.record(format!("Knowledge base error: {e}"));
                return Err(error);
            }
        };

        if !context.is_empty() && context != NO_CONTEXT_FOUND {
            log.record(format!(
                "Context retrieved: {}",
                preview(&context, self.config.preview_chars)
            ));
            state.context = Some(context);
            state.knowledge_processed = true;
            state.knowledge_api_key = api_key.map(str::to_string);
            state.knowledge_embedding_model = Some(embedding_model.to_string());
        } else {
            log.record("No relevant context found");
            state.context = None;
        }

        Ok(())
    }

    async fn run_llm_engine(
        &self,
        node: &Node,
        state: &mut RunState,
        log: &mut ExecutionLog,
    ) -> Result<(), NodeError> {
        log.record("Generating LLM response...");

        let config = node.config();
        let model = config
            .text("model")
            .unwrap_or(self.config.default_llm_model.as_str());
        let temperature = match config.number("temperature") {
            Ok(value) => value.map_or(self.config.default_temperature, |t| t as f32),
            Err(e) => {
                record_llm_failure(state, log, &e.to_string());
                return Err(e);
            }
        };
        let custom_prompt = config.text("prompt");

        let api_key = match config.trimmed_text("api-key") {
            Some(key) => {
                log.record("Using API key from LLM Engine component");
                Some(key.to_string())
            }
            None => match state.knowledge_api_key.clone() {
                Some(key) => {
                    log.record("Using API key from Knowledge Base component");
                    Some(key)
                }
                None => {
                    log.record("No API key provided for LLM");
                    None
                }
            },
        };

        log.record(format!("Using model: {model}, temperature: {temperature}"));
        match &state.context {
            Some(context) => log.record(format!(
                "Using context: {} characters",
                context.chars().count()
            )),
            None => log.record("No context available - direct query to LLM"),
        }

        let generated = self
            .generator
            .generate(&GenerationRequest {
                query: &state.user_query,
                context: state.context.as_deref(),
                custom_prompt,
                api_key: api_key.as_deref(),
                model,
                temperature,
            })
            .await;

        let response = match generated {
            Ok(response) => response,
            Err(e) => {
                let reason = e.to_string();
                record_llm_failure(state, log, &reason);
                return Err(NodeError::GenerationFailed { reason });
            }
        };

        if !response.is_empty() && !is_error_response(&response) {
            log.record(format!(
                "LLM response: {}",
                preview(&response, self.config.preview_chars)
            ));
            state.llm_response = Some(response);
            Ok(())
        } else {
            log.record(format!("LLM error: {response}"));
            state.llm_response = Some(if response.is_empty() {
                EMPTY_RESPONSE_FALLBACK.to_string()
            } else {
                response.clone()
            });
            Err(NodeError::GenerationRejected { response })
        }
    }

    fn run_output(node: &Node, state: &mut RunState, log: &mut ExecutionLog) {
        log.record("Formatting output...");

        let response = state
            .llm_response
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| format!("Echo: {}", state.user_query));

        let output = if node.config().flag("includeMetadata") {
            FinalOutput::WithMetadata {
                response,
                metadata: state.metadata(),
            }
        } else {
            FinalOutput::Text(response)
        };

        state.final_output = Some(output);
        log.record("Output formatted successfully");
    }
}

fn record_llm_failure(state: &mut RunState, log: &mut ExecutionLog, reason: &str) {
    log.record(format!("LLM engine error: {reason}"));
    state.llm_response = Some(format!("Sorry, I encountered an error: {reason}"));
}
