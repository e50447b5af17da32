//! HTTP entry point
//!
//! A thin axum surface over the pipelines. Authentication is delegated to
//! the store's session introspection; a missing header is rejected before
//! any store call happens.

use axum::{
  extract::State,
  http::{header, HeaderMap, StatusCode},
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::llm::ChatModel;
use crate::pipeline::{self, PipelineError, QuestionContext};
use crate::store::{DataStore, Session, StoreError};

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn DataStore>,
  pub model: Arc<dyn ChatModel>,
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/generate-suggestions", post(generate_suggestions))
    .route("/analyze-patterns", post(analyze_patterns))
    .route("/generate-questions", post(generate_questions))
    .route("/health", get(health))
    .layer(TraceLayer::new_for_http())
    // The browser front end is served from a different origin
    .layer(CorsLayer::permissive())
    .with_state(state)
}

/// ---------------------------------------------------------------------------
/// Handlers
/// ---------------------------------------------------------------------------

async fn generate_suggestions(State(state): State<AppState>, headers: HeaderMap) -> Response {
  let session = match authenticate(state.store.as_ref(), &headers).await {
    Ok(session) => session,
    Err(rejection) => return rejection,
  };

  match pipeline::generate_suggestions(state.store.as_ref(), state.model.as_ref(), &session).await
  {
    Ok(suggestions) => (StatusCode::OK, Json(suggestions)).into_response(),
    Err(e) => pipeline_failure("generate-suggestions", e),
  }
}

async fn analyze_patterns(State(state): State<AppState>, headers: HeaderMap) -> Response {
  let session = match authenticate(state.store.as_ref(), &headers).await {
    Ok(session) => session,
    Err(rejection) => return rejection,
  };

  match pipeline::analyze_patterns(state.store.as_ref(), state.model.as_ref(), &session).await {
    Ok(analysis) => (StatusCode::OK, Json(analysis)).into_response(),
    Err(e) => pipeline_failure("analyze-patterns", e),
  }
}

async fn generate_questions(
  State(state): State<AppState>,
  headers: HeaderMap,
  body: Option<Json<QuestionContext>>,
) -> Response {
  let session = match authenticate(state.store.as_ref(), &headers).await {
    Ok(session) => session,
    Err(rejection) => return rejection,
  };

  let context = body.map(|Json(context)| context).unwrap_or_default();

  match pipeline::generate_questions(
    state.store.as_ref(),
    state.model.as_ref(),
    &session,
    &context,
  )
  .await
  {
    Ok(questions) => (
      StatusCode::OK,
      Json(serde_json::json!({ "questions": questions })),
    )
      .into_response(),
    Err(e) => pipeline_failure("generate-questions", e),
  }
}

async fn health() -> Response {
  Json(serde_json::json!({
    "status": "OK",
    "timestamp": Utc::now().to_rfc3339(),
  }))
  .into_response()
}

/// ---------------------------------------------------------------------------
/// Authentication & Error Mapping
/// ---------------------------------------------------------------------------

/// Resolve the caller. The store is only contacted once a header exists.
async fn authenticate(store: &dyn DataStore, headers: &HeaderMap) -> Result<Session, Response> {
  let value = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| error_response(StatusCode::UNAUTHORIZED, "No authorization header"))?;

  let token = value.strip_prefix("Bearer ").unwrap_or(value);

  match store.authenticated_user(token).await {
    Ok(session) => Ok(session),
    Err(StoreError::Unauthorized) => {
      Err(error_response(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
    Err(e) => {
      tracing::error!(error = %e, "session introspection failed");
      Err(error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &e.to_string(),
      ))
    }
  }
}

fn pipeline_failure(endpoint: &str, error: PipelineError) -> Response {
  tracing::error!(endpoint, error = %error, "pipeline failed");
  error_response(StatusCode::INTERNAL_SERVER_ERROR, &error.to_string())
}

fn error_response(status: StatusCode, message: &str) -> Response {
  (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
