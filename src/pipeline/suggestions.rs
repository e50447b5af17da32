//! Suggestion generation pipeline
//!
//! Given an authenticated caller, derive a fresh batch of personalized
//! suggestions from their latest analysis, recent check-ins, and assessment
//! responses, store the batch, and return the caller's full open backlog.
//! Deliberately not idempotent: every successful call appends a new batch.

use crate::llm::ChatModel;
use crate::models::{AssessmentResponse, CheckIn, SleepAnalysis, Suggestion, SuggestionPlan};
use crate::pipeline::{parse_strict, PipelineError};
use crate::store::{DataStore, Session};

const SYSTEM_PROMPT: &str = include_str!("../prompts/suggestion_system.txt");

/// How many recent check-ins the model sees
const CHECKIN_CONTEXT_LIMIT: u32 = 7;

/// Low temperature: downstream parsing requires strict-JSON compliance
const TEMPERATURE: f32 = 0.4;
const MAX_TOKENS: u32 = 1200;

pub async fn generate_suggestions(
  store: &dyn DataStore,
  model: &dyn ChatModel,
  session: &Session,
) -> Result<Vec<Suggestion>, PipelineError> {
  // Missing context (no analysis yet, no check-ins) is not an error; the
  // prompt simply carries nulls and empty lists.
  let latest_analysis = store.latest_analysis(session).await?;
  let recent_checkins = store.recent_checkins(session, CHECKIN_CONTEXT_LIMIT).await?;
  let responses = store.assessment_responses(session).await?;

  let prompt = build_prompt(&latest_analysis, &recent_checkins, &responses);
  let raw = model
    .complete(SYSTEM_PROMPT, &prompt, MAX_TOKENS, TEMPERATURE)
    .await?;

  let plan: SuggestionPlan = parse_strict(&raw)?;

  let batch = plan.flatten(&session.user_id);
  if !batch.is_empty() {
    store.insert_suggestions(session, &batch).await?;
  }

  tracing::info!(
    user_id = %session.user_id,
    generated = batch.len(),
    "stored suggestion batch"
  );

  // Return the whole open backlog, not just the new batch
  store.open_suggestions(session).await.map_err(Into::into)
}

fn build_prompt(
  latest_analysis: &Option<SleepAnalysis>,
  recent_checkins: &[CheckIn],
  responses: &[AssessmentResponse],
) -> String {
  format!(
    r#"You are an AI sleep coach. Based on the user's sleep analysis and recent data, generate personalized suggestions for improving their sleep.

Latest Sleep Analysis:
{}

Recent Check-ins:
{}

User Responses:
{}

Generate specific, actionable suggestions in three categories:
1. Immediate actions (tonight/today)
2. Weekly goals (this week)
3. Long-term changes (next 2-4 weeks)

Each suggestion should be:
- Specific and actionable
- Based on their actual data patterns
- Realistic and achievable
- Evidence-based

Return ONLY a JSON object with this structure:
{{
  "immediate": [
    {{
      "title": "Short actionable title",
      "description": "Detailed explanation and instructions",
      "priority": 1
    }}
  ],
  "weekly": [
    {{
      "title": "Weekly goal title",
      "description": "What to do and why",
      "priority": 2
    }}
  ],
  "longterm": [
    {{
      "title": "Long-term change title",
      "description": "How to implement this change",
      "priority": 3
    }}
  ]
}}"#,
    to_pretty_json(latest_analysis),
    to_pretty_json(&recent_checkins),
    to_pretty_json(&responses),
  )
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> String {
  serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
