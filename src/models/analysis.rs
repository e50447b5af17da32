use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Structured sleep-pattern summary, as computed by the analysis pipeline
/// and stored in the `pattern_data` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepPatterns {
  /// "improving" | "declining" | "stable"
  pub sleep_quality_trend: String,
  /// Hours
  pub average_sleep_duration: f64,
  /// 1-10
  pub consistency_score: f64,
  pub stress_correlation: String,
  pub energy_correlation: String,
}

/// A derived summary of a user's recent sleep patterns.
/// One per (user, analysis date); replaced wholesale on regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SleepAnalysis {
  pub id: String,
  pub user_id: String,
  pub analysis_date: NaiveDate,
  pub pattern_data: SleepPatterns,
  pub insights: Option<String>,
  pub recommendations: Option<Vec<String>>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For upserting an analysis (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSleepAnalysis {
  pub user_id: String,
  pub analysis_date: NaiveDate,
  pub pattern_data: SleepPatterns,
  pub insights: Option<String>,
  pub recommendations: Option<Vec<String>>,
}

/// The exact shape the analysis model is instructed to return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternAnalysis {
  pub patterns: SleepPatterns,
  /// Narrative analysis
  pub insights: String,
  pub root_causes: Vec<String>,
  /// "low" | "medium" | "high"
  pub risk_level: String,
  pub recommendations: Vec<String>,
}
