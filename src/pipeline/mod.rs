//! Generation pipelines
//!
//! Each pipeline runs the same sequence against pluggable transports:
//! gather context from the store, render a prompt, call the model, validate
//! the response strictly, persist, and return. Every failure is terminal
//! for the current request; nothing here retries.

pub mod analysis;
pub mod questions;
pub mod suggestions;

pub use analysis::analyze_patterns;
pub use questions::{generate_questions, QuestionContext};
pub use suggestions::generate_suggestions;

use thiserror::Error;

use crate::llm::LlmError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PipelineError {
  /// The model's output was not the JSON shape it was instructed to emit.
  #[error("Invalid response format from AI: {0}")]
  ResponseFormat(String),

  #[error(transparent)]
  Model(#[from] LlmError),

  #[error(transparent)]
  Store(#[from] StoreError),
}

/// Strict parse of a model completion into its instructed schema.
/// No markdown stripping, no brace hunting: anything other than the exact
/// JSON shape is a format error, logged with the raw offending text.
fn parse_strict<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, PipelineError> {
  serde_json::from_str(raw.trim()).map_err(|e| {
    tracing::error!(raw_response = raw, "model response failed validation");
    PipelineError::ResponseFormat(e.to_string())
  })
}
