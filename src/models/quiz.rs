// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'quiz_items' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizItem {
    pub id: i64,
    pub question_text: String,
    pub topic_id: i64,
    pub difficulty_id: i64,
    pub creator_id: Option<i64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_active: bool,
}

/// Represents the 'quiz_options' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizOption {
    pub id: i64,
    pub quiz_id: i64,
    pub option_text: String,
    pub is_correct: bool,
}

/// Option as exposed to quiz takers. The correctness flag never leaves
/// the server through quiz endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicOption {
    pub id: i64,
    pub text: String,
}

/// A quiz item joined with its dimension names and public options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetail {
    pub id: i64,
    pub question_text: String,
    pub topic: String,
    pub difficulty: String,
    pub options: Vec<PublicOption>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One option of a quiz under creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOption {
    pub text: String,
    pub is_correct: bool,
}

/// DTO for creating a new quiz item with its options.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: String,

    pub topic_id: i64,
    pub difficulty_id: i64,

    #[validate(custom(function = validate_options))]
    pub options: Vec<NewOption>,
}

/// Every quiz item needs at least two options with exactly one of them
/// marked correct. The schema does not enforce this; the API does.
fn validate_options(options: &[NewOption]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("too_few_options"));
    }
    if options.iter().any(|o| o.text.trim().is_empty()) {
        return Err(validator::ValidationError::new("empty_option_text"));
    }
    if options.iter().any(|o| o.text.len() > 500) {
        return Err(validator::ValidationError::new("option_too_long"));
    }
    let correct_count = options.iter().filter(|o| o.is_correct).count();
    if correct_count != 1 {
        return Err(validator::ValidationError::new("exactly_one_correct_required"));
    }
    Ok(())
}

/// DTO for partial quiz updates. Options are immutable once created.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question_text: Option<String>,
    pub topic_id: Option<i64>,
    pub difficulty_id: Option<i64>,
}

/// Query parameters for listing quizzes.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct QuizListParams {
    /// Filter by topic name.
    pub topic: Option<String>,
    /// Filter by difficulty name.
    pub difficulty: Option<String>,
    /// Number of items to return (default: 50, max: 100).
    pub limit: Option<i64>,
}

/// DTO for answering a quiz.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub option_id: i64,
}

/// Outcome of an answered quiz: the awarded score and a feedback message.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub correct: bool,
    pub score: f64,
    pub message: String,
}
