// src/handlers/ml.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::SqlitePool;

use crate::{error::AppError, models::score::PredictionResponse, utils::jwt::Claims};

/// Coefficient of the offline-trained linear regression mapping a user's
/// average score to an ideal difficulty level in [0, 2]. The training
/// happens in an external script; only the serving contract lives here.
const MODEL_SCORE_COEFFICIENT: f64 = 0.02;

fn predict_level(average_score: f64) -> f64 {
    (average_score * MODEL_SCORE_COEFFICIENT).clamp(0.0, 2.0)
}

fn level_name(level: f64) -> &'static str {
    // Nearest of the three dimension levels: 0 easy, 1 medium, 2 hard.
    match level.round() as i64 {
        0 => "easy",
        1 => "medium",
        _ => "hard",
    }
}

/// Recommends a quiz difficulty for a user from their average score.
/// Callers may query themselves; admins may query anyone.
pub async fn predict_difficulty(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.user_id()? != user_id && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "Cannot request predictions for other users".to_string(),
        ));
    }

    let user_exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM users WHERE id = $1 AND is_active = 1")
            .bind(user_id)
            .fetch_optional(&pool)
            .await?;
    if user_exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let average_score: f64 = sqlx::query_scalar(
        "SELECT COALESCE(AVG(score), 0.0) FROM user_scores WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let predicted_level = predict_level(average_score);

    Ok(Json(PredictionResponse {
        user_id,
        average_score,
        predicted_level,
        recommended_difficulty: level_name(predicted_level).to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_average_maps_to_easy() {
        assert_eq!(level_name(predict_level(10.0)), "easy");
    }

    #[test]
    fn mid_average_maps_to_medium() {
        assert_eq!(level_name(predict_level(50.0)), "medium");
    }

    #[test]
    fn high_average_saturates_at_hard() {
        assert_eq!(level_name(predict_level(95.0)), "hard");
        // Clamped: even absurd averages stay within the dimension range.
        assert_eq!(predict_level(10_000.0), 2.0);
    }
}
