//! Model invocation collaborator
//!
//! This module handles communication with the Groq chat-completion API.
//! The pipelines depend only on the `ChatModel` trait so the transport can
//! be swapped out in tests.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// ---------------------------------------------------------------------------
/// Configuration
/// ---------------------------------------------------------------------------

const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "llama3-70b-8192";

/// An unresponsive model call must not block a request forever.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LlmError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("No completion content in model response")]
  EmptyCompletion,
}

/// ---------------------------------------------------------------------------
/// Chat Model Trait
/// ---------------------------------------------------------------------------

/// A single chat-style completion: fixed system instruction, one user
/// message, bounded output, explicit sampling temperature.
#[async_trait]
pub trait ChatModel: Send + Sync {
  async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
    temperature: f32,
  ) -> Result<String, LlmError>;
}

/// ---------------------------------------------------------------------------
/// Groq API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessage>,
  temperature: f32,
  max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
  role: String,
  content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
  message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
  content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
  error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Groq Client
/// ---------------------------------------------------------------------------

pub struct GroqClient {
  client: Client,
  api_key: String,
  base_url: String,
}

impl GroqClient {
  pub fn new(api_key: String) -> Self {
    let client = Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .unwrap_or_default();

    Self {
      client,
      api_key,
      base_url: GROQ_API_BASE.to_string(),
    }
  }

  /// Point the client at a different API base (used by tests)
  pub fn with_base_url(mut self, base_url: String) -> Self {
    self.base_url = base_url;
    self
  }
}

#[async_trait]
impl ChatModel for GroqClient {
  async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    max_tokens: u32,
    temperature: f32,
  ) -> Result<String, LlmError> {
    let request = ChatCompletionRequest {
      model: GROQ_MODEL.to_string(),
      messages: vec![
        ChatMessage {
          role: "system".to_string(),
          content: system_prompt.to_string(),
        },
        ChatMessage {
          role: "user".to_string(),
          content: user_message.to_string(),
        },
      ],
      temperature,
      max_tokens,
    };

    let response = self
      .client
      .post(format!("{}/chat/completions", self.base_url))
      .bearer_auth(&self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      // Try to parse a structured error response
      if let Ok(error_resp) = serde_json::from_str::<ApiErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let completion: ChatCompletionResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    completion
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .filter(|content| !content.is_empty())
      .ok_or(LlmError::EmptyCompletion)
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
