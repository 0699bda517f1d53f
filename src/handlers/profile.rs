// src/handlers/profile.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::POINTS_PER_CORRECT_ANSWER,
    error::AppError,
    handlers::auth::fetch_user,
    models::{
        score::{Activity, ScoreEntry, UserStats},
        user::UpdateProfileRequest,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Get current user's profile.
pub async fn get_me(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = fetch_user(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Partially update the current user's profile.
/// Only the provided fields change; the bio is sanitized before storage.
pub async fn update_me(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    fetch_user(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    if let Some(full_name) = payload.full_name {
        sqlx::query("UPDATE users SET full_name = $1 WHERE id = $2")
            .bind(full_name)
            .bind(user_id)
            .execute(&pool)
            .await?;
    }

    if let Some(email) = payload.email {
        sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(user_id)
            .execute(&pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    AppError::Conflict("Email already in use".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
    }

    if let Some(phone) = payload.phone {
        sqlx::query("UPDATE users SET phone = $1 WHERE id = $2")
            .bind(phone)
            .bind(user_id)
            .execute(&pool)
            .await?;
    }

    if let Some(bio) = payload.bio {
        sqlx::query("UPDATE users SET bio = $1 WHERE id = $2")
            .bind(clean_html(&bio))
            .bind(user_id)
            .execute(&pool)
            .await?;
    }

    let user = fetch_user(&pool, user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

#[derive(Debug, sqlx::FromRow)]
struct ScoreAggregates {
    total_score: f64,
    quizzes_completed: i64,
    average_score: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerAggregates {
    answered: i64,
    correct: i64,
}

/// Aggregated performance numbers for the current user.
pub async fn my_stats(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let scores = sqlx::query_as::<_, ScoreAggregates>(
        r#"
        SELECT
            COALESCE(SUM(score), 0.0) AS total_score,
            COUNT(id) AS quizzes_completed,
            COALESCE(AVG(score), 0.0) AS average_score
        FROM user_scores
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let answers = sqlx::query_as::<_, AnswerAggregates>(
        r#"
        SELECT
            COUNT(id) AS answered,
            COALESCE(SUM(CASE WHEN is_correct THEN 1 ELSE 0 END), 0) AS correct
        FROM user_answers
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await?;

    let accuracy = if answers.answered > 0 {
        answers.correct as f64 / answers.answered as f64 * 100.0
    } else {
        0.0
    };

    Ok(Json(UserStats {
        total_score: scores.total_score,
        quizzes_completed: scores.quizzes_completed,
        accuracy,
        average_score: scores.average_score,
    }))
}

/// Score history for the current user, newest first.
/// Quiz columns are NULL for scores whose quiz item was hard-deleted.
pub async fn my_scores(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let scores = sqlx::query_as::<_, ScoreEntry>(
        r#"
        SELECT
            s.id,
            s.score,
            s.quiz_id,
            q.question_text,
            t.name AS topic,
            d.name AS difficulty,
            s.created_at AS timestamp
        FROM user_scores s
        LEFT JOIN quiz_items q ON s.quiz_id = q.id
        LEFT JOIN topics t ON q.topic_id = t.id
        LEFT JOIN difficulties d ON q.difficulty_id = d.id
        WHERE s.user_id = $1
        ORDER BY s.created_at DESC, s.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(scores))
}

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
    pub limit: Option<i64>,
}

/// Recent answer log entries for the current user.
pub async fn my_activities(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let limit = params.limit.unwrap_or(10).clamp(1, 100);

    let activities = sqlx::query_as::<_, Activity>(
        r#"
        SELECT
            CASE WHEN a.is_correct THEN 'Quiz answered correctly' ELSE 'Quiz answered' END AS action,
            t.name AS topic,
            d.name AS difficulty,
            CASE WHEN a.is_correct THEN $3 ELSE 0.0 END AS score,
            a.created_at AS timestamp
        FROM user_answers a
        LEFT JOIN quiz_options o ON a.option_id = o.id
        LEFT JOIN quiz_items q ON o.quiz_id = q.id
        LEFT JOIN topics t ON q.topic_id = t.id
        LEFT JOIN difficulties d ON q.difficulty_id = d.id
        WHERE a.user_id = $1
        ORDER BY a.created_at DESC, a.id DESC
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(POINTS_PER_CORRECT_ANSWER)
    .fetch_all(&pool)
    .await?;

    Ok(Json(activities))
}
