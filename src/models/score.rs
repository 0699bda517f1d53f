// src/models/score.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'user_scores' table in the database.
/// One row per completed quiz attempt. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserScore {
    pub id: i64,
    pub user_id: i64,
    /// NULL once the quiz item has been hard-deleted; the score stays.
    pub quiz_id: Option<i64>,
    pub score: f64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A score row joined with its quiz item and dimension names,
/// as returned by /users/me/scores.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub id: i64,
    pub score: f64,
    pub quiz_id: Option<i64>,
    pub question_text: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Recent activity feed entry, one per logged answer.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Activity {
    pub action: String,
    pub topic: Option<String>,
    pub difficulty: Option<String>,
    pub score: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Aggregated performance numbers for the current user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_score: f64,
    pub quizzes_completed: i64,
    /// Percentage of logged answers that were correct.
    pub accuracy: f64,
    pub average_score: f64,
}

/// A ranked leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub username: String,
    pub total_score: f64,
    pub quizzes_completed: i64,
    pub accuracy: f64,
}

/// DTO for recording a score directly through /submit-score.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubmitScoreRequest {
    pub quiz_id: i64,
    #[validate(range(min = 0.0))]
    pub score: f64,
}

/// Output of the difficulty recommendation model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub user_id: i64,
    pub average_score: f64,
    /// Continuous model output in [0, 2].
    pub predicted_level: f64,
    pub recommended_difficulty: String,
}

/// System-wide counters for the administration page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_users: i64,
    pub active_users: i64,
    pub active_quizzes: i64,
    pub total_attempts: i64,
}
