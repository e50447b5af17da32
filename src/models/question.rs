use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog entry defining one assessment prompt and its answer options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  pub question_text: String,
  pub category: String,
  /// Ordered answer options
  pub options: Vec<String>,
  pub is_active: Option<bool>,
  pub order_index: Option<i64>,
  pub created_at: Option<DateTime<Utc>>,
}

/// For inserting new catalog questions (without id, created_at)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuestion {
  pub question_text: String,
  pub category: String,
  pub options: Vec<String>,
  pub is_active: bool,
  pub order_index: i64,
}

/// One follow-up question as emitted by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
  pub question: String,
  pub category: String,
  pub options: Vec<String>,
}

impl GeneratedQuestion {
  pub fn into_new(self, order_index: i64) -> NewQuestion {
    NewQuestion {
      question_text: self.question,
      category: self.category,
      options: self.options,
      is_active: true,
      order_index,
    }
  }
}
