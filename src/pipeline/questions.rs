//! Follow-up question generation pipeline
//!
//! Turns the caller's prior answers and recent check-ins into 3-5 new
//! multiple-choice assessment questions, appended to the catalog after the
//! fixed questionnaire.

use serde::Deserialize;

use crate::llm::ChatModel;
use crate::models::{CheckIn, GeneratedQuestion, NewQuestion};
use crate::pipeline::{parse_strict, PipelineError};
use crate::store::{DataStore, Session};

const SYSTEM_PROMPT: &str = include_str!("../prompts/question_system.txt");

const CHECKIN_CONTEXT_LIMIT: u32 = 7;
/// Generated questions sort after the fixed questionnaire
const GENERATED_ORDER_INDEX: i64 = 999;
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

/// Caller-supplied context forwarded from the request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionContext {
  pub user_responses: Option<serde_json::Value>,
  pub current_patterns: Option<String>,
}

pub async fn generate_questions(
  store: &dyn DataStore,
  model: &dyn ChatModel,
  session: &Session,
  context: &QuestionContext,
) -> Result<Vec<GeneratedQuestion>, PipelineError> {
  let recent_checkins = store.recent_checkins(session, CHECKIN_CONTEXT_LIMIT).await?;

  let prompt = build_prompt(context, &recent_checkins);
  let raw = model
    .complete(SYSTEM_PROMPT, &prompt, MAX_TOKENS, TEMPERATURE)
    .await?;

  let questions: Vec<GeneratedQuestion> = parse_strict(&raw)?;
  if questions.is_empty() {
    return Err(PipelineError::ResponseFormat(
      "model returned an empty question list".to_string(),
    ));
  }

  let batch: Vec<NewQuestion> = questions
    .iter()
    .cloned()
    .map(|q| q.into_new(GENERATED_ORDER_INDEX))
    .collect();
  store.insert_questions(session, &batch).await?;

  tracing::info!(
    user_id = %session.user_id,
    generated = questions.len(),
    "stored generated questions"
  );

  Ok(questions)
}

fn build_prompt(context: &QuestionContext, recent_checkins: &[CheckIn]) -> String {
  let prior_responses = context
    .user_responses
    .as_ref()
    .map(|v| serde_json::to_string_pretty(v).unwrap_or_else(|_| "null".to_string()))
    .unwrap_or_else(|| "null".to_string());

  format!(
    r#"You are an AI sleep specialist. Based on the user's responses and recent sleep data, generate 3-5 follow-up questions to better understand their insomnia patterns.

Previous responses:
{}

Recent sleep data (last 7 days):
{}

Current patterns identified:
{}

Generate 3-5 specific, personalized follow-up questions that will help identify the root cause of their sleep issues. Each question should:
1. Be specific to their previous answers
2. Help narrow down potential causes
3. Be answerable with multiple choice options
4. Focus on areas not yet thoroughly explored

Return ONLY a JSON array of questions in this format:
[
  {{
    "question": "Based on your bedtime routine, when do you typically start feeling sleepy?",
    "category": "Sleep Onset Timing",
    "options": ["Before my usual bedtime", "Right at bedtime", "1-2 hours after bedtime", "I never feel naturally sleepy", "It varies significantly"]
  }}
]"#,
    prior_responses,
    serde_json::to_string_pretty(recent_checkins).unwrap_or_else(|_| "[]".to_string()),
    context.current_patterns.as_deref().unwrap_or("None provided"),
  )
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
