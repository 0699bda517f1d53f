// src/handlers/quiz.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    config::POINTS_PER_CORRECT_ANSWER,
    error::AppError,
    models::{
        dimension::{Difficulty, Topic},
        quiz::{
            AnswerRequest, AnswerResponse, CreateQuizRequest, PublicOption, QuizDetail,
            QuizListParams, UpdateQuizRequest,
        },
        score::SubmitScoreRequest,
    },
    utils::{html::clean_html, jwt::Claims},
};

/// Quiz header row joined with its dimension names.
#[derive(Debug, sqlx::FromRow)]
struct QuizRow {
    id: i64,
    question_text: String,
    topic: String,
    difficulty: String,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl QuizRow {
    fn into_detail(self, options: Vec<PublicOption>) -> QuizDetail {
        QuizDetail {
            id: self.id,
            question_text: self.question_text,
            topic: self.topic,
            difficulty: self.difficulty,
            options,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OptionRow {
    id: i64,
    quiz_id: i64,
    option_text: String,
}

/// Loads the public options for a set of quiz ids in one round-trip.
async fn load_options(
    pool: &SqlitePool,
    quiz_ids: &[i64],
) -> Result<HashMap<i64, Vec<PublicOption>>, AppError> {
    let mut by_quiz: HashMap<i64, Vec<PublicOption>> = HashMap::new();

    if quiz_ids.is_empty() {
        return Ok(by_quiz);
    }

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, quiz_id, option_text FROM quiz_options WHERE quiz_id IN (",
    );
    let mut separated = query_builder.separated(",");
    for id in quiz_ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY id");

    let rows: Vec<OptionRow> = query_builder.build_query_as().fetch_all(pool).await?;

    for row in rows {
        by_quiz.entry(row.quiz_id).or_default().push(PublicOption {
            id: row.id,
            text: row.option_text,
        });
    }

    Ok(by_quiz)
}

fn attach_options(
    rows: Vec<QuizRow>,
    mut options: HashMap<i64, Vec<PublicOption>>,
) -> Vec<QuizDetail> {
    rows.into_iter()
        .map(|row| {
            let opts = options.remove(&row.id).unwrap_or_default();
            row.into_detail(opts)
        })
        .collect()
}

/// Lists active quizzes, optionally filtered by topic and difficulty name.
/// The correctness flags never appear in the response.
pub async fn list_quizzes(
    State(pool): State<SqlitePool>,
    Query(params): Query<QuizListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);

    let mut query_builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT q.id, q.question_text, t.name AS topic, d.name AS difficulty, q.created_at
        FROM quiz_items q
        JOIN topics t ON q.topic_id = t.id
        JOIN difficulties d ON q.difficulty_id = d.id
        WHERE q.is_active = 1
        "#,
    );

    if let Some(topic) = &params.topic {
        query_builder.push(" AND t.name = ").push_bind(topic);
    }
    if let Some(difficulty) = &params.difficulty {
        query_builder.push(" AND d.name = ").push_bind(difficulty);
    }
    query_builder.push(" ORDER BY q.id DESC LIMIT ").push_bind(limit);

    let rows: Vec<QuizRow> = query_builder.build_query_as().fetch_all(&pool).await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let options = load_options(&pool, &ids).await?;

    Ok(Json(attach_options(rows, options)))
}

#[derive(Debug, Deserialize)]
pub struct AvailableParams {
    pub limit: Option<i64>,
}

/// Lists active quizzes the caller has not completed yet
/// (no score row recorded for them).
pub async fn available_quizzes(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<AvailableParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let limit = params.limit.unwrap_or(50).clamp(1, 100);

    let rows = sqlx::query_as::<_, QuizRow>(
        r#"
        SELECT q.id, q.question_text, t.name AS topic, d.name AS difficulty, q.created_at
        FROM quiz_items q
        JOIN topics t ON q.topic_id = t.id
        JOIN difficulties d ON q.difficulty_id = d.id
        WHERE q.is_active = 1
          AND NOT EXISTS (
              SELECT 1 FROM user_scores s WHERE s.quiz_id = q.id AND s.user_id = $1
          )
        ORDER BY q.id
        LIMIT $2
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(&pool)
    .await?;

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let options = load_options(&pool, &ids).await?;

    Ok(Json(attach_options(rows, options)))
}

/// Fetches a single active quiz with its options.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, QuizRow>(
        r#"
        SELECT q.id, q.question_text, t.name AS topic, d.name AS difficulty, q.created_at
        FROM quiz_items q
        JOIN topics t ON q.topic_id = t.id
        JOIN difficulties d ON q.difficulty_id = d.id
        WHERE q.id = $1 AND q.is_active = 1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let options = load_options(&pool, &[id]).await?;

    Ok(Json(
        row.into_detail(options.into_values().next().unwrap_or_default()),
    ))
}

/// Creates a new quiz item together with its options.
///
/// The request must carry at least two options with exactly one marked
/// correct; anything else is rejected with 400 before touching the database.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let creator_id = claims.user_id()?;

    let topic: Option<Topic> = sqlx::query_as("SELECT id, name FROM topics WHERE id = $1")
        .bind(payload.topic_id)
        .fetch_optional(&pool)
        .await?;
    let topic = topic.ok_or(AppError::BadRequest("Unknown topic".to_string()))?;

    let difficulty: Option<Difficulty> =
        sqlx::query_as("SELECT id, name FROM difficulties WHERE id = $1")
            .bind(payload.difficulty_id)
            .fetch_optional(&pool)
            .await?;
    let difficulty = difficulty.ok_or(AppError::BadRequest("Unknown difficulty".to_string()))?;

    // Quiz item and options land together or not at all.
    let mut tx = pool.begin().await?;

    let quiz_id = sqlx::query(
        r#"
        INSERT INTO quiz_items (question_text, topic_id, difficulty_id, creator_id)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(clean_html(&payload.question_text))
    .bind(payload.topic_id)
    .bind(payload.difficulty_id)
    .bind(creator_id)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for option in &payload.options {
        sqlx::query(
            "INSERT INTO quiz_options (quiz_id, option_text, is_correct) VALUES ($1, $2, $3)",
        )
        .bind(quiz_id)
        .bind(clean_html(&option.text))
        .bind(option.is_correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!("Quiz {} created by user {}", quiz_id, creator_id);

    let options = load_options(&pool, &[quiz_id]).await?;
    let detail = QuizDetail {
        id: quiz_id,
        question_text: payload.question_text,
        topic: topic.name,
        difficulty: difficulty.name,
        options: options.into_values().next().unwrap_or_default(),
        created_at: None,
    };

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Partially updates a quiz item. Admin only.
/// Options are immutable; replacing them means creating a new quiz.
pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM quiz_items WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    if let Some(question_text) = payload.question_text {
        sqlx::query("UPDATE quiz_items SET question_text = $1 WHERE id = $2")
            .bind(clean_html(&question_text))
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(topic_id) = payload.topic_id {
        sqlx::query("UPDATE quiz_items SET topic_id = $1 WHERE id = $2")
            .bind(topic_id)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|_| AppError::BadRequest("Unknown topic".to_string()))?;
    }

    if let Some(difficulty_id) = payload.difficulty_id {
        sqlx::query("UPDATE quiz_items SET difficulty_id = $1 WHERE id = $2")
            .bind(difficulty_id)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|_| AppError::BadRequest("Unknown difficulty".to_string()))?;
    }

    sqlx::query("UPDATE quiz_items SET updated_at = CURRENT_TIMESTAMP WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::OK)
}

/// Soft-deletes a quiz item. Admin only.
///
/// The row stays in place with is_active = 0 so score and answer history
/// keep their joins; only a schema-level hard delete cascades to options.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE quiz_items SET is_active = 0 WHERE id = $1 AND is_active = 1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerKey {
    is_correct: bool,
}

/// Submits an answer to a quiz.
///
/// Appends one user_answers row and one user_scores row (the completed
/// attempt); both are history and never mutated afterwards. The correct
/// option earns a fixed number of points, everything else earns zero.
pub async fn answer_quiz(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;

    let quiz_exists: Option<i64> =
        sqlx::query_scalar("SELECT id FROM quiz_items WHERE id = $1 AND is_active = 1")
            .bind(id)
            .fetch_optional(&pool)
            .await?;
    if quiz_exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let key = sqlx::query_as::<_, AnswerKey>(
        "SELECT is_correct FROM quiz_options WHERE id = $1 AND quiz_id = $2",
    )
    .bind(payload.option_id)
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound(
        "Option does not belong to this quiz".to_string(),
    ))?;

    let score = if key.is_correct {
        POINTS_PER_CORRECT_ANSWER
    } else {
        0.0
    };

    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO user_answers (user_id, option_id, is_correct) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(payload.option_id)
        .bind(key.is_correct)
        .execute(&mut *tx)
        .await?;

    sqlx::query("INSERT INTO user_scores (user_id, quiz_id, score) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(id)
        .bind(score)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let message = if key.is_correct {
        format!("Correct! You earned {} points.", score as i64)
    } else {
        "Incorrect. Better luck on the next one.".to_string()
    };

    Ok(Json(AnswerResponse {
        correct: key.is_correct,
        score,
        message,
    }))
}

/// Records a score directly. Append-only; there is no update path.
pub async fn submit_score(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitScoreRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id = claims.user_id()?;

    let quiz_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM quiz_items WHERE id = $1")
        .bind(payload.quiz_id)
        .fetch_optional(&pool)
        .await?;
    if quiz_exists.is_none() {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let score_id = sqlx::query("INSERT INTO user_scores (user_id, quiz_id, score) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(payload.quiz_id)
        .bind(payload.score)
        .execute(&pool)
        .await?
        .last_insert_rowid();

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": score_id })),
    ))
}

/// Lists the topic dimension table.
pub async fn list_topics(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let topics = sqlx::query_as::<_, Topic>("SELECT id, name FROM topics ORDER BY id")
        .fetch_all(&pool)
        .await?;

    Ok(Json(topics))
}

/// Lists the difficulty dimension table.
pub async fn list_difficulties(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let difficulties =
        sqlx::query_as::<_, Difficulty>("SELECT id, name FROM difficulties ORDER BY id")
            .fetch_all(&pool)
            .await?;

    Ok(Json(difficulties))
}
