use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Urgency horizon of a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
  /// Tonight/today
  Immediate,
  /// This week
  Weekly,
  /// Next 2-4 weeks
  Longterm,
}

impl SuggestionCategory {
  pub fn as_str(&self) -> &'static str {
    match self {
      SuggestionCategory::Immediate => "immediate",
      SuggestionCategory::Weekly => "weekly",
      SuggestionCategory::Longterm => "longterm",
    }
  }
}

/// A stored suggestion row. Mutated only when the user marks it complete;
/// never physically deleted in normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
  pub id: String,
  pub user_id: String,
  pub suggestion_type: SuggestionCategory,
  pub title: String,
  pub description: String,
  /// Smaller = more urgent
  pub priority: Option<i64>,
  pub is_completed: Option<bool>,
  pub created_at: Option<DateTime<Utc>>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Suggestion {
  pub fn is_open(&self) -> bool {
    !self.is_completed.unwrap_or(false)
  }
}

/// For inserting new suggestions (without id, timestamps)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSuggestion {
  pub user_id: String,
  pub suggestion_type: SuggestionCategory,
  pub title: String,
  pub description: String,
  pub priority: i64,
}

/// One suggestion as emitted by the model, before it is tagged with a
/// category and a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedSuggestion {
  pub title: String,
  pub description: String,
  pub priority: i64,
}

/// The exact shape the model is instructed to return.
///
/// All three category keys are required; a response missing any of them
/// fails deserialization and the whole invocation is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionPlan {
  pub immediate: Vec<PlannedSuggestion>,
  pub weekly: Vec<PlannedSuggestion>,
  pub longterm: Vec<PlannedSuggestion>,
}

impl SuggestionPlan {
  pub fn len(&self) -> usize {
    self.immediate.len() + self.weekly.len() + self.longterm.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Merge the three category arrays into one insert batch, tagging each
  /// element with its source category. Within-category order is preserved.
  pub fn flatten(self, user_id: &str) -> Vec<NewSuggestion> {
    let tag = |items: Vec<PlannedSuggestion>, category: SuggestionCategory| {
      items.into_iter().map(move |s| NewSuggestion {
        user_id: user_id.to_string(),
        suggestion_type: category,
        title: s.title,
        description: s.description,
        priority: s.priority,
      })
    };

    tag(self.immediate, SuggestionCategory::Immediate)
      .chain(tag(self.weekly, SuggestionCategory::Weekly))
      .chain(tag(self.longterm, SuggestionCategory::Longterm))
      .collect()
  }
}
