//! Core domain types and utilities shared by the stackflow crates.
//!
//! This crate provides the strongly-typed identifiers and the rootcause-based
//! `Result` alias used throughout the pipeline engine and its collaborators.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{DocumentId, ParseIdError, WorkflowId, WorkflowRunId};
