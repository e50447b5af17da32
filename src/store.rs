//! Data access collaborator
//!
//! The hosted relational store is reached over its REST row API; every call
//! forwards the caller's bearer token so row-level scoping is enforced by
//! the store itself, never by this service. Pipelines depend only on the
//! `DataStore` trait.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::models::{
  AssessmentResponse, CheckIn, NewQuestion, NewSleepAnalysis, NewSuggestion, SleepAnalysis,
  Suggestion,
};

/// ---------------------------------------------------------------------------
/// Configuration Constants
/// ---------------------------------------------------------------------------

const REST_PREFIX: &str = "rest/v1";
const AUTH_USER_PATH: &str = "auth/v1/user";
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Request failed: {0}")]
  Request(String),

  #[error("Unauthorized")]
  Unauthorized,

  #[error("Store error: HTTP {status}: {body}")]
  Api { status: u16, body: String },

  #[error("Parse error: {0}")]
  Parse(String),

  #[error("Invalid store URL: {0}")]
  InvalidUrl(String),
}

/// ---------------------------------------------------------------------------
/// Caller Identity
/// ---------------------------------------------------------------------------

/// The authenticated caller: resolved user id plus the bearer token that
/// proved it, forwarded on every subsequent store call.
#[derive(Debug, Clone)]
pub struct Session {
  pub user_id: String,
  pub bearer: String,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
  id: String,
}

/// ---------------------------------------------------------------------------
/// Data Store Trait
/// ---------------------------------------------------------------------------

#[async_trait]
pub trait DataStore: Send + Sync {
  /// Resolve a bearer token to a caller identity via session introspection.
  async fn authenticated_user(&self, bearer: &str) -> Result<Session, StoreError>;

  /// The caller's single most recent sleep analysis, if any.
  async fn latest_analysis(&self, session: &Session) -> Result<Option<SleepAnalysis>, StoreError>;

  /// The caller's most recent check-ins, newest first.
  async fn recent_checkins(&self, session: &Session, limit: u32)
    -> Result<Vec<CheckIn>, StoreError>;

  /// The caller's check-ins on or after `date`, oldest first.
  async fn checkins_since(
    &self,
    session: &Session,
    date: NaiveDate,
  ) -> Result<Vec<CheckIn>, StoreError>;

  /// All of the caller's assessment responses, oldest first.
  async fn assessment_responses(
    &self,
    session: &Session,
  ) -> Result<Vec<AssessmentResponse>, StoreError>;

  /// Insert a batch of suggestions in a single write.
  async fn insert_suggestions(
    &self,
    session: &Session,
    batch: &[NewSuggestion],
  ) -> Result<(), StoreError>;

  /// The caller's suggestions whose completion flag is false or unset,
  /// newest first.
  async fn open_suggestions(&self, session: &Session) -> Result<Vec<Suggestion>, StoreError>;

  /// Replace the caller's analysis for `analysis.analysis_date`.
  async fn upsert_analysis(
    &self,
    session: &Session,
    analysis: &NewSleepAnalysis,
  ) -> Result<(), StoreError>;

  /// Append generated questions to the shared catalog.
  async fn insert_questions(
    &self,
    session: &Session,
    batch: &[NewQuestion],
  ) -> Result<(), StoreError>;
}

/// ---------------------------------------------------------------------------
/// REST Implementation
/// ---------------------------------------------------------------------------

pub struct RestStore {
  client: Client,
  base_url: Url,
  anon_key: String,
}

impl RestStore {
  pub fn new(base_url: Url, anon_key: String) -> Self {
    let client = Client::builder()
      .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
      .build()
      .unwrap_or_default();

    Self {
      client,
      base_url,
      anon_key,
    }
  }

  fn table_url(&self, table: &str) -> Result<Url, StoreError> {
    self
      .base_url
      .join(&format!("{}/{}", REST_PREFIX, table))
      .map_err(|e| StoreError::InvalidUrl(e.to_string()))
  }

  fn with_auth(&self, request: RequestBuilder, bearer: &str) -> RequestBuilder {
    request.bearer_auth(bearer).header("apikey", &self.anon_key)
  }

  /// Read the body and map non-success statuses onto the error taxonomy.
  async fn checked_body(response: reqwest::Response) -> Result<String, StoreError> {
    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| StoreError::Request(e.to_string()))?;

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
      return Err(StoreError::Unauthorized);
    }
    if !status.is_success() {
      return Err(StoreError::Api {
        status: status.as_u16(),
        body,
      });
    }

    Ok(body)
  }

  async fn fetch_rows<T: DeserializeOwned>(
    &self,
    session: &Session,
    url: Url,
  ) -> Result<Vec<T>, StoreError> {
    let response = self
      .with_auth(self.client.get(url), &session.bearer)
      .send()
      .await
      .map_err(|e| StoreError::Request(e.to_string()))?;

    let body = Self::checked_body(response).await?;
    serde_json::from_str(&body).map_err(|e| StoreError::Parse(e.to_string()))
  }

  async fn insert_rows<T: Serialize>(
    &self,
    session: &Session,
    url: Url,
    rows: &[T],
    prefer: &str,
  ) -> Result<(), StoreError> {
    let response = self
      .with_auth(self.client.post(url), &session.bearer)
      .header("Prefer", prefer)
      .json(rows)
      .send()
      .await
      .map_err(|e| StoreError::Request(e.to_string()))?;

    Self::checked_body(response).await?;
    Ok(())
  }
}

#[async_trait]
impl DataStore for RestStore {
  async fn authenticated_user(&self, bearer: &str) -> Result<Session, StoreError> {
    let url = self
      .base_url
      .join(AUTH_USER_PATH)
      .map_err(|e| StoreError::InvalidUrl(e.to_string()))?;

    let response = self
      .with_auth(self.client.get(url), bearer)
      .send()
      .await
      .map_err(|e| StoreError::Request(e.to_string()))?;

    let body = Self::checked_body(response).await?;
    let user: AuthUser =
      serde_json::from_str(&body).map_err(|e| StoreError::Parse(e.to_string()))?;

    Ok(Session {
      user_id: user.id,
      bearer: bearer.to_string(),
    })
  }

  async fn latest_analysis(&self, session: &Session) -> Result<Option<SleepAnalysis>, StoreError> {
    let mut url = self.table_url("sleep_patterns")?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("user_id", &format!("eq.{}", session.user_id))
      .append_pair("order", "analysis_date.desc")
      .append_pair("limit", "1");

    let rows: Vec<SleepAnalysis> = self.fetch_rows(session, url).await?;
    Ok(rows.into_iter().next())
  }

  async fn recent_checkins(
    &self,
    session: &Session,
    limit: u32,
  ) -> Result<Vec<CheckIn>, StoreError> {
    let mut url = self.table_url("daily_checkins")?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("user_id", &format!("eq.{}", session.user_id))
      .append_pair("order", "checkin_date.desc")
      .append_pair("limit", &limit.to_string());

    self.fetch_rows(session, url).await
  }

  async fn checkins_since(
    &self,
    session: &Session,
    date: NaiveDate,
  ) -> Result<Vec<CheckIn>, StoreError> {
    let mut url = self.table_url("daily_checkins")?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("user_id", &format!("eq.{}", session.user_id))
      .append_pair("checkin_date", &format!("gte.{}", date))
      .append_pair("order", "checkin_date.asc");

    self.fetch_rows(session, url).await
  }

  async fn assessment_responses(
    &self,
    session: &Session,
  ) -> Result<Vec<AssessmentResponse>, StoreError> {
    let mut url = self.table_url("user_responses")?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("user_id", &format!("eq.{}", session.user_id))
      .append_pair("order", "created_at.asc");

    self.fetch_rows(session, url).await
  }

  async fn insert_suggestions(
    &self,
    session: &Session,
    batch: &[NewSuggestion],
  ) -> Result<(), StoreError> {
    let url = self.table_url("suggestions")?;
    self
      .insert_rows(session, url, batch, "return=minimal")
      .await
  }

  async fn open_suggestions(&self, session: &Session) -> Result<Vec<Suggestion>, StoreError> {
    let mut url = self.table_url("suggestions")?;
    url
      .query_pairs_mut()
      .append_pair("select", "*")
      .append_pair("user_id", &format!("eq.{}", session.user_id))
      // Legacy rows may carry NULL instead of false
      .append_pair("or", "(is_completed.eq.false,is_completed.is.null)")
      .append_pair("order", "created_at.desc");

    self.fetch_rows(session, url).await
  }

  async fn upsert_analysis(
    &self,
    session: &Session,
    analysis: &NewSleepAnalysis,
  ) -> Result<(), StoreError> {
    let mut url = self.table_url("sleep_patterns")?;
    url
      .query_pairs_mut()
      .append_pair("on_conflict", "user_id,analysis_date");

    self
      .insert_rows(
        session,
        url,
        std::slice::from_ref(analysis),
        "resolution=merge-duplicates,return=minimal",
      )
      .await
  }

  async fn insert_questions(
    &self,
    session: &Session,
    batch: &[NewQuestion],
  ) -> Result<(), StoreError> {
    let url = self.table_url("questions")?;
    self
      .insert_rows(session, url, batch, "return=minimal")
      .await
  }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
