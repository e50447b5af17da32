pub mod analysis;
pub mod checkin;
pub mod question;
pub mod suggestion;

pub use analysis::{NewSleepAnalysis, PatternAnalysis, SleepAnalysis, SleepPatterns};
pub use checkin::{AssessmentResponse, CheckIn};
pub use question::{GeneratedQuestion, NewQuestion, Question};
pub use suggestion::{
  NewSuggestion, PlannedSuggestion, Suggestion, SuggestionCategory, SuggestionPlan,
};
