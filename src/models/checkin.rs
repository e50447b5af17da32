use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A user's daily self-reported sleep metrics.
///
/// One row per (user, date); the front end upserts on conflict so a second
/// check-in on the same day replaces the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
  pub id: String,
  pub user_id: String,
  pub checkin_date: NaiveDate,
  /// 1 (terrible) to 10 (excellent)
  pub sleep_quality: Option<i64>,
  /// Hours, fractional
  pub sleep_duration: Option<f64>,
  /// Minutes
  pub time_to_fall_asleep: Option<i64>,
  /// 1 (calm) to 10 (very stressed)
  pub stress_level: Option<i64>,
  /// 1 (exhausted) to 10 (energized)
  pub energy_level: Option<i64>,
  pub notes: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

/// A stored answer to one assessment question. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResponse {
  pub id: String,
  pub user_id: String,
  pub question_text: String,
  pub category: String,
  pub answer: String,
  pub session_id: String,
  /// Link back to the catalog question, when the answer came from one
  pub question_id: Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}
