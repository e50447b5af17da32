//! Pattern analysis pipeline
//!
//! Summarizes the caller's last week of check-ins and all assessment
//! responses into a structured `SleepAnalysis`, replacing any existing
//! analysis for today.

use chrono::{Days, Utc};

use crate::llm::ChatModel;
use crate::models::{AssessmentResponse, CheckIn, NewSleepAnalysis, PatternAnalysis};
use crate::pipeline::{parse_strict, PipelineError};
use crate::store::{DataStore, Session};

const SYSTEM_PROMPT: &str = include_str!("../prompts/analysis_system.txt");

const WINDOW_DAYS: u64 = 7;
const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 1500;

pub async fn analyze_patterns(
  store: &dyn DataStore,
  model: &dyn ChatModel,
  session: &Session,
) -> Result<PatternAnalysis, PipelineError> {
  let today = Utc::now().date_naive();
  let window_start = today - Days::new(WINDOW_DAYS);

  let checkins = store.checkins_since(session, window_start).await?;
  let responses = store.assessment_responses(session).await?;

  let prompt = build_prompt(&checkins, &responses);
  let raw = model
    .complete(SYSTEM_PROMPT, &prompt, MAX_TOKENS, TEMPERATURE)
    .await?;

  let analysis: PatternAnalysis = parse_strict(&raw)?;

  // One analysis per (user, date); today's is replaced wholesale
  let record = NewSleepAnalysis {
    user_id: session.user_id.clone(),
    analysis_date: today,
    pattern_data: analysis.patterns.clone(),
    insights: Some(analysis.insights.clone()),
    recommendations: Some(analysis.recommendations.clone()),
  };
  store.upsert_analysis(session, &record).await?;

  tracing::info!(
    user_id = %session.user_id,
    risk_level = %analysis.risk_level,
    "stored sleep analysis"
  );

  Ok(analysis)
}

fn build_prompt(checkins: &[CheckIn], responses: &[AssessmentResponse]) -> String {
  format!(
    r#"You are an AI sleep specialist. Analyze this user's sleep data and responses to identify patterns and root causes of their insomnia.

Daily check-ins (last 7 days):
{}

Assessment responses:
{}

Provide a comprehensive analysis including:
1. Key patterns identified in their sleep data
2. Potential root causes of their insomnia
3. Sleep quality trends
4. Correlations between different factors (stress, energy, sleep quality)
5. Risk factors and areas of concern

Return ONLY a JSON object with this structure:
{{
  "patterns": {{
    "sleep_quality_trend": "improving/declining/stable",
    "average_sleep_duration": 7.0,
    "consistency_score": 5,
    "stress_correlation": "description",
    "energy_correlation": "description"
  }},
  "insights": "detailed narrative analysis",
  "root_causes": ["list", "of", "identified", "causes"],
  "risk_level": "low/medium/high",
  "recommendations": ["list", "of", "immediate", "recommendations"]
}}"#,
    serde_json::to_string_pretty(checkins).unwrap_or_else(|_| "[]".to_string()),
    serde_json::to_string_pretty(responses).unwrap_or_else(|_| "[]".to_string()),
  )
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
