// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{error::AppError, models::score::LeaderboardEntry};

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub limit: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct LeaderboardRow {
    username: String,
    total_score: f64,
    quizzes_completed: i64,
    accuracy: f64,
}

/// Users ranked by aggregate score, highest first.
///
/// Only active users with at least one recorded score appear. Rank is
/// assigned after the fetch so ties keep a stable ordering.
pub async fn get_leaderboard(
    State(pool): State<SqlitePool>,
    Query(params): Query<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let rows = sqlx::query_as::<_, LeaderboardRow>(
        r#"
        SELECT
            u.username,
            COALESCE(SUM(s.score), 0.0) AS total_score,
            COUNT(s.id) AS quizzes_completed,
            COALESCE((
                SELECT AVG(CASE WHEN a.is_correct THEN 100.0 ELSE 0.0 END)
                FROM user_answers a
                WHERE a.user_id = u.id
            ), 0.0) AS accuracy
        FROM users u
        JOIN user_scores s ON s.user_id = u.id
        WHERE u.is_active = 1
        GROUP BY u.id
        ORDER BY total_score DESC, u.username
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to fetch leaderboard: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let leaderboard: Vec<LeaderboardEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i as i64 + 1,
            username: row.username,
            total_score: row.total_score,
            quizzes_completed: row.quizzes_completed,
            accuracy: row.accuracy,
        })
        .collect();

    Ok(Json(leaderboard))
}
