//! Test utilities and helpers
//!
//! In-memory implementations of both transports (`MockStore`, `MockModel`)
//! plus factories for model-response payloads. The mocks record every call
//! so tests can assert what was and was not touched.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::llm::{ChatModel, LlmError};
use crate::models::{
  AssessmentResponse, CheckIn, NewQuestion, NewSleepAnalysis, NewSuggestion, SleepAnalysis,
  Suggestion,
};
use crate::store::{DataStore, Session, StoreError};

/// ---------------------------------------------------------------------------
/// Mock Data Store
/// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
  /// token -> user_id
  sessions: HashMap<String, String>,
  checkins: Vec<CheckIn>,
  responses: Vec<AssessmentResponse>,
  analyses: Vec<SleepAnalysis>,
  suggestions: Vec<Suggestion>,
  questions: Vec<NewQuestion>,
  pending_insert_failures: u32,
  calls: usize,
  last_checkins_since: Option<NaiveDate>,
  seq: i64,
}

pub struct MockStore {
  state: Mutex<StoreState>,
}

impl MockStore {
  pub fn new() -> Self {
    Self {
      state: Mutex::new(StoreState::default()),
    }
  }

  /// Register a valid bearer token and return the session it resolves to.
  pub fn grant(&self, token: &str, user_id: &str) -> Session {
    let mut state = self.state.lock().unwrap();
    state.sessions.insert(token.to_string(), user_id.to_string());
    Session {
      user_id: user_id.to_string(),
      bearer: token.to_string(),
    }
  }

  /// Monotonically increasing creation time, strictly ordered per row.
  fn next_created_at(state: &mut StoreState) -> DateTime<Utc> {
    state.seq += 1;
    Utc::now() - Duration::hours(1) + Duration::seconds(state.seq)
  }

  pub fn seed_suggestion(&self, user_id: &str, title: &str, completed: bool) {
    let mut state = self.state.lock().unwrap();
    let created_at = Self::next_created_at(&mut state);
    let id = format!("seed-{}", state.seq);
    state.suggestions.push(Suggestion {
      id,
      user_id: user_id.to_string(),
      suggestion_type: crate::models::SuggestionCategory::Immediate,
      title: title.to_string(),
      description: "seeded".to_string(),
      priority: Some(1),
      is_completed: if completed { Some(true) } else { None },
      created_at: Some(created_at),
      updated_at: None,
    });
  }

  pub fn seed_checkin(&self, checkin: CheckIn) {
    self.state.lock().unwrap().checkins.push(checkin);
  }

  pub fn seed_response(&self, response: AssessmentResponse) {
    self.state.lock().unwrap().responses.push(response);
  }

  /// Make the next insert fail with a store error.
  pub fn fail_next_insert(&self) {
    self.state.lock().unwrap().pending_insert_failures += 1;
  }

  pub fn stored_suggestion_count(&self) -> usize {
    self.state.lock().unwrap().suggestions.len()
  }

  pub fn stored_questions(&self) -> Vec<NewQuestion> {
    self.state.lock().unwrap().questions.clone()
  }

  pub fn stored_analysis_count(&self, user_id: &str) -> usize {
    self
      .state
      .lock()
      .unwrap()
      .analyses
      .iter()
      .filter(|a| a.user_id == user_id)
      .count()
  }

  pub fn latest_analysis_record(&self, user_id: &str) -> Option<SleepAnalysis> {
    let state = self.state.lock().unwrap();
    state
      .analyses
      .iter()
      .filter(|a| a.user_id == user_id)
      .max_by_key(|a| a.analysis_date)
      .cloned()
  }

  /// Number of store calls made through the `DataStore` trait.
  pub fn call_count(&self) -> usize {
    self.state.lock().unwrap().calls
  }

  pub fn last_checkins_since(&self) -> Option<NaiveDate> {
    self.state.lock().unwrap().last_checkins_since
  }

  fn take_insert_failure(state: &mut StoreState) -> Result<(), StoreError> {
    if state.pending_insert_failures > 0 {
      state.pending_insert_failures -= 1;
      return Err(StoreError::Api {
        status: 500,
        body: "insert failed".to_string(),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl DataStore for MockStore {
  async fn authenticated_user(&self, bearer: &str) -> Result<Session, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    match state.sessions.get(bearer) {
      Some(user_id) => Ok(Session {
        user_id: user_id.clone(),
        bearer: bearer.to_string(),
      }),
      None => Err(StoreError::Unauthorized),
    }
  }

  async fn latest_analysis(&self, session: &Session) -> Result<Option<SleepAnalysis>, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    Ok(
      state
        .analyses
        .iter()
        .filter(|a| a.user_id == session.user_id)
        .max_by_key(|a| a.analysis_date)
        .cloned(),
    )
  }

  async fn recent_checkins(
    &self,
    session: &Session,
    limit: u32,
  ) -> Result<Vec<CheckIn>, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    let mut rows: Vec<CheckIn> = state
      .checkins
      .iter()
      .filter(|c| c.user_id == session.user_id)
      .cloned()
      .collect();
    rows.sort_by(|a, b| b.checkin_date.cmp(&a.checkin_date));
    rows.truncate(limit as usize);
    Ok(rows)
  }

  async fn checkins_since(
    &self,
    session: &Session,
    date: NaiveDate,
  ) -> Result<Vec<CheckIn>, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    state.last_checkins_since = Some(date);
    let mut rows: Vec<CheckIn> = state
      .checkins
      .iter()
      .filter(|c| c.user_id == session.user_id && c.checkin_date >= date)
      .cloned()
      .collect();
    rows.sort_by_key(|c| c.checkin_date);
    Ok(rows)
  }

  async fn assessment_responses(
    &self,
    session: &Session,
  ) -> Result<Vec<AssessmentResponse>, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    Ok(
      state
        .responses
        .iter()
        .filter(|r| r.user_id == session.user_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_suggestions(
    &self,
    _session: &Session,
    batch: &[NewSuggestion],
  ) -> Result<(), StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    Self::take_insert_failure(&mut state)?;

    for new in batch {
      let created_at = Self::next_created_at(&mut state);
      let id = format!("s-{}", state.seq);
      state.suggestions.push(Suggestion {
        id,
        user_id: new.user_id.clone(),
        suggestion_type: new.suggestion_type,
        title: new.title.clone(),
        description: new.description.clone(),
        priority: Some(new.priority),
        is_completed: Some(false),
        created_at: Some(created_at),
        updated_at: None,
      });
    }
    Ok(())
  }

  async fn open_suggestions(&self, session: &Session) -> Result<Vec<Suggestion>, StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    let mut rows: Vec<Suggestion> = state
      .suggestions
      .iter()
      .filter(|s| s.user_id == session.user_id && s.is_open())
      .cloned()
      .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(rows)
  }

  async fn upsert_analysis(
    &self,
    _session: &Session,
    analysis: &NewSleepAnalysis,
  ) -> Result<(), StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    Self::take_insert_failure(&mut state)?;

    state
      .analyses
      .retain(|a| !(a.user_id == analysis.user_id && a.analysis_date == analysis.analysis_date));
    let created_at = Self::next_created_at(&mut state);
    let id = format!("a-{}", state.seq);
    state.analyses.push(SleepAnalysis {
      id,
      user_id: analysis.user_id.clone(),
      analysis_date: analysis.analysis_date,
      pattern_data: analysis.pattern_data.clone(),
      insights: analysis.insights.clone(),
      recommendations: analysis.recommendations.clone(),
      created_at: Some(created_at),
    });
    Ok(())
  }

  async fn insert_questions(
    &self,
    _session: &Session,
    batch: &[NewQuestion],
  ) -> Result<(), StoreError> {
    let mut state = self.state.lock().unwrap();
    state.calls += 1;
    Self::take_insert_failure(&mut state)?;
    state.questions.extend_from_slice(batch);
    Ok(())
  }
}

/// ---------------------------------------------------------------------------
/// Mock Chat Model
/// ---------------------------------------------------------------------------

enum ModelScript {
  Reply(String),
  Fail(String),
}

pub struct MockModel {
  script: ModelScript,
  calls: Mutex<Vec<(String, String)>>,
}

impl MockModel {
  /// A model that always returns the given text.
  pub fn replying(reply: String) -> Self {
    Self {
      script: ModelScript::Reply(reply),
      calls: Mutex::new(Vec::new()),
    }
  }

  /// A model whose API call always fails.
  pub fn failing(message: &str) -> Self {
    Self {
      script: ModelScript::Fail(message.to_string()),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn last_user_message(&self) -> String {
    self
      .calls
      .lock()
      .unwrap()
      .last()
      .map(|(_, user)| user.clone())
      .expect("model was never called")
  }
}

#[async_trait]
impl ChatModel for MockModel {
  async fn complete(
    &self,
    system_prompt: &str,
    user_message: &str,
    _max_tokens: u32,
    _temperature: f32,
  ) -> Result<String, LlmError> {
    self
      .calls
      .lock()
      .unwrap()
      .push((system_prompt.to_string(), user_message.to_string()));

    match &self.script {
      ModelScript::Reply(text) => Ok(text.clone()),
      ModelScript::Fail(message) => Err(LlmError::Api(message.clone())),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Payload Factories
/// ---------------------------------------------------------------------------

/// A valid suggestion plan with the requested number of entries per category.
pub fn plan_json(immediate: usize, weekly: usize, longterm: usize) -> String {
  let entries = |category: &str, count: usize, base_priority: i64| -> Vec<serde_json::Value> {
    (0..count)
      .map(|i| {
        serde_json::json!({
          "title": format!("{} suggestion {}", category, i + 1),
          "description": format!("Do the {} thing number {}.", category, i + 1),
          "priority": base_priority + i as i64,
        })
      })
      .collect()
  };

  serde_json::json!({
    "immediate": entries("immediate", immediate, 1),
    "weekly": entries("weekly", weekly, 1),
    "longterm": entries("longterm", longterm, 1),
  })
  .to_string()
}

/// A valid pattern analysis payload.
pub fn analysis_json(trend: &str, risk_level: &str) -> String {
  serde_json::json!({
    "patterns": {
      "sleep_quality_trend": trend,
      "average_sleep_duration": 6.4,
      "consistency_score": 5,
      "stress_correlation": "quality drops on high-stress days",
      "energy_correlation": "energy tracks duration"
    },
    "insights": "Sleep onset is delayed by evening stress.",
    "root_causes": ["irregular bedtime", "evening screen time"],
    "risk_level": risk_level,
    "recommendations": ["fixed wake time", "wind-down routine"]
  })
  .to_string()
}

/// A valid generated-question array.
pub fn questions_json(count: usize) -> String {
  let questions: Vec<serde_json::Value> = (0..count)
    .map(|i| {
      serde_json::json!({
        "question": format!("Follow-up question {}?", i + 1),
        "category": "Sleep Onset Timing",
        "options": ["Option A", "Option B", "Option C"],
      })
    })
    .collect();
  serde_json::to_string(&questions).unwrap()
}

/// A check-in row for the given user and date.
pub fn mock_checkin(user_id: &str, date: &str) -> CheckIn {
  CheckIn {
    id: format!("c-{}", date),
    user_id: user_id.to_string(),
    checkin_date: date.parse().expect("valid date"),
    sleep_quality: Some(6),
    sleep_duration: Some(7.5),
    time_to_fall_asleep: Some(25),
    stress_level: Some(4),
    energy_level: Some(5),
    notes: None,
    created_at: Some(Utc::now()),
  }
}

/// An assessment response row for the given user.
pub fn mock_response(user_id: &str, question: &str, answer: &str) -> AssessmentResponse {
  AssessmentResponse {
    id: format!("r-{}", question.len()),
    user_id: user_id.to_string(),
    question_text: question.to_string(),
    category: "General".to_string(),
    answer: answer.to_string(),
    session_id: "sess-1".to_string(),
    question_id: None,
    created_at: Some(Utc::now()),
  }
}

/// ---------------------------------------------------------------------------
/// Tests for Test Utilities
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_mock_store_resolves_granted_tokens_only() {
    let store = MockStore::new();
    store.grant("good", "u1");

    assert!(store.authenticated_user("good").await.is_ok());
    assert!(matches!(
      store.authenticated_user("bad").await,
      Err(StoreError::Unauthorized)
    ));
  }

  #[tokio::test]
  async fn test_mock_store_orders_open_suggestions_newest_first() {
    let store = MockStore::new();
    let session = store.grant("t", "u1");
    store.seed_suggestion("u1", "first", false);
    store.seed_suggestion("u1", "second", false);

    let rows = store.open_suggestions(&session).await.unwrap();
    assert_eq!(rows[0].title, "second");
    assert_eq!(rows[1].title, "first");
  }

  #[test]
  fn test_plan_json_parses_as_plan() {
    let plan: crate::models::SuggestionPlan =
      serde_json::from_str(&plan_json(2, 1, 0)).unwrap();
    assert_eq!(plan.len(), 3);
  }

  #[test]
  fn test_analysis_json_parses_as_analysis() {
    let analysis: crate::models::PatternAnalysis =
      serde_json::from_str(&analysis_json("stable", "low")).unwrap();
    assert_eq!(analysis.risk_level, "low");
  }
}
