//! Engine configuration.
//!
//! Defaults apply to nodes whose configuration leaves a setting out. Values
//! can be overridden from `STACKFLOW__*` environment variables, e.g.
//! `STACKFLOW__RETRIEVAL_K=5`.

use serde::{Deserialize, Serialize};

/// Defaults and limits for pipeline runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model used by LLM Engine nodes that do not name one.
    #[serde(default = "default_llm_model")]
    pub default_llm_model: String,

    /// Temperature used by LLM Engine nodes that do not set one.
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Embedding model used by KnowledgeBase nodes that do not name one.
    #[serde(default = "default_embedding_model")]
    pub default_embedding_model: String,

    /// Number of passages requested from the retriever.
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,

    /// Longest context or response excerpt written to the execution trace.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_retrieval_k() -> usize {
    3
}

fn default_preview_chars() -> usize {
    200
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_llm_model: default_llm_model(),
            default_temperature: default_temperature(),
            default_embedding_model: default_embedding_model(),
            retrieval_k: default_retrieval_k(),
            preview_chars: default_preview_chars(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from `STACKFLOW__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value of the wrong type.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("STACKFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(config)
    }

    /// Reads configuration from an already assembled `config::Config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value has the wrong type.
    pub fn from_config(config: config::Config) -> Result<Self, config::ConfigError> {
        config.try_deserialize()
    }
}
