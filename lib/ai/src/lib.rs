//! LLM response generation for stackflow.
//!
//! This crate implements the engine's `ResponseGenerator` capability on top
//! of a provider-agnostic [`LlmBackend`]:
//!
//! - **Backend**: request/response types and the provider trait
//! - **Prompt**: the built-in answer templates and custom prompt rendering
//! - **Responder**: key checks, prompt building, and error reporting

pub mod backend;
pub mod error;
pub mod prompt;
pub mod responder;

pub use backend::{LlmBackend, LlmRequest, LlmResponse, TokenUsage};
pub use error::{LlmError, PromptError};
pub use prompt::{PromptTemplate, build_prompt};
pub use responder::LlmResponder;
