// tests/quiz_tests.rs

use std::str::FromStr;

use eco_skillup::{config::Config, routes, state::AppState};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

async fn spawn_app() -> (String, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse connect options")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory SQLite");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "quiz_test_secret".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
        admin_email: None,
    };

    let state = AppState {
        pool: pool.clone(),
        config,
    };

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Registers a user and returns (user_id, token).
async fn register(client: &reqwest::Client, address: &str, username: &str) -> (i64, String) {
    let auth: serde_json::Value = client
        .post(format!("{}/api/v1/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{}@example.com", username),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed")
        .json()
        .await
        .expect("Failed to parse register json");

    (
        auth["user"]["id"].as_i64().unwrap(),
        auth["access_token"].as_str().unwrap().to_string(),
    )
}

/// Registers a user, promotes it to admin and logs in again so the
/// token carries the admin role.
async fn register_admin(
    client: &reqwest::Client,
    address: &str,
    pool: &SqlitePool,
    username: &str,
) -> String {
    register(client, address, username).await;

    sqlx::query("UPDATE users SET role = 'admin' WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await
        .unwrap();

    let auth: serde_json::Value = client
        .post(format!("{}/api/v1/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    auth["access_token"].as_str().unwrap().to_string()
}

/// Seeds a quiz straight into the database.
/// Returns (quiz_id, correct_option_id, wrong_option_id).
async fn seed_quiz(pool: &SqlitePool, question: &str) -> (i64, i64, i64) {
    let quiz_id = sqlx::query(
        "INSERT INTO quiz_items (question_text, topic_id, difficulty_id) VALUES ($1, 1, 1)",
    )
    .bind(question)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid();

    let correct = sqlx::query(
        "INSERT INTO quiz_options (quiz_id, option_text, is_correct) VALUES ($1, 'Right', 1)",
    )
    .bind(quiz_id)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid();

    let wrong = sqlx::query(
        "INSERT INTO quiz_options (quiz_id, option_text, is_correct) VALUES ($1, 'Wrong', 0)",
    )
    .bind(quiz_id)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid();

    (quiz_id, correct, wrong)
}

async fn answer(
    client: &reqwest::Client,
    address: &str,
    token: &str,
    quiz_id: i64,
    option_id: i64,
) -> serde_json::Value {
    client
        .post(format!("{}/api/v1/quizzes/{}/answer", address, quiz_id))
        .bearer_auth(token)
        .json(&serde_json::json!({ "option_id": option_id }))
        .send()
        .await
        .expect("Answer failed")
        .json()
        .await
        .expect("Failed to parse answer json")
}

#[tokio::test]
async fn create_quiz_rejects_bad_option_sets() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_admin(&client, &address, &pool, &unique_name("adm")).await;

    // No correct option
    let response = client
        .post(format!("{}/api/v1/quizzes", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "question_text": "Pick one",
            "topic_id": 1,
            "difficulty_id": 1,
            "options": [
                { "text": "A", "is_correct": false },
                { "text": "B", "is_correct": false }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Two correct options
    let response = client
        .post(format!("{}/api/v1/quizzes", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "question_text": "Pick one",
            "topic_id": 1,
            "difficulty_id": 1,
            "options": [
                { "text": "A", "is_correct": true },
                { "text": "B", "is_correct": true }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // A single option
    let response = client
        .post(format!("{}/api/v1/quizzes", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "question_text": "Pick one",
            "topic_id": 1,
            "difficulty_id": 1,
            "options": [
                { "text": "A", "is_correct": true }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn create_quiz_never_exposes_answer_key() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_admin(&client, &address, &pool, &unique_name("adm")).await;

    let response = client
        .post(format!("{}/api/v1/quizzes", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "question_text": "What does ML stand for?",
            "topic_id": 4,
            "difficulty_id": 1,
            "options": [
                { "text": "Machine Learning", "is_correct": true },
                { "text": "Meta Language", "is_correct": false }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let quiz: serde_json::Value = response.json().await.unwrap();
    assert_eq!(quiz["topic"], "Machine Learning");
    assert_eq!(quiz["options"].as_array().unwrap().len(), 2);
    for option in quiz["options"].as_array().unwrap() {
        assert!(option.get("is_correct").is_none());
    }

    // The public read path hides it as well.
    let fetched: serde_json::Value = client
        .get(format!("{}/api/v1/quizzes/{}", address, quiz["id"]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    for option in fetched["options"].as_array().unwrap() {
        assert!(option.get("is_correct").is_none());
    }
}

#[tokio::test]
async fn update_quiz_changes_question_text() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = register_admin(&client, &address, &pool, &unique_name("adm")).await;
    let (quiz_id, _, _) = seed_quiz(&pool, "Old question").await;

    let response = client
        .put(format!("{}/api/v1/quizzes/{}", address, quiz_id))
        .bearer_auth(&admin_token)
        .json(&serde_json::json!({ "question_text": "New question" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let quiz: serde_json::Value = client
        .get(format!("{}/api/v1/quizzes/{}", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(quiz["question_text"], "New question");

    // A regular user cannot reach the update route.
    let (_, token) = register(&client, &address, &unique_name("u")).await;
    let response = client
        .put(format!("{}/api/v1/quizzes/{}", address, quiz_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "question_text": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn answering_awards_fixed_points() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = register(&client, &address, &unique_name("u")).await;

    let (quiz_a, correct, _) = seed_quiz(&pool, "Question A").await;
    let (quiz_b, _, wrong) = seed_quiz(&pool, "Question B").await;

    let result = answer(&client, &address, &token, quiz_a, correct).await;
    assert_eq!(result["correct"], true);
    assert_eq!(result["score"], 10.0);

    let result = answer(&client, &address, &token, quiz_b, wrong).await;
    assert_eq!(result["correct"], false);
    assert_eq!(result["score"], 0.0);
}

#[tokio::test]
async fn answering_with_foreign_option_fails() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = register(&client, &address, &unique_name("u")).await;

    let (quiz_a, _, _) = seed_quiz(&pool, "Question A").await;
    let (_, correct_b, _) = seed_quiz(&pool, "Question B").await;

    let response = client
        .post(format!("{}/api/v1/quizzes/{}/answer", address, quiz_a))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "option_id": correct_b }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn available_excludes_completed_quizzes() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = register(&client, &address, &unique_name("u")).await;

    let (quiz_a, correct, _) = seed_quiz(&pool, "Question A").await;
    let (quiz_b, _, _) = seed_quiz(&pool, "Question B").await;

    let available: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/quizzes/available", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = available.iter().map(|q| q["id"].as_i64().unwrap()).collect();
    assert!(ids.contains(&quiz_a));
    assert!(ids.contains(&quiz_b));

    answer(&client, &address, &token, quiz_a, correct).await;

    let available: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/quizzes/available", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<i64> = available.iter().map(|q| q["id"].as_i64().unwrap()).collect();
    assert!(!ids.contains(&quiz_a), "completed quiz must disappear");
    assert!(ids.contains(&quiz_b));
}

#[tokio::test]
async fn soft_delete_hides_quiz_but_keeps_history() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let admin_token = register_admin(&client, &address, &pool, &unique_name("adm")).await;
    let (user_id, token) = register(&client, &address, &unique_name("u")).await;

    let (quiz_id, correct, _) = seed_quiz(&pool, "Disappearing question").await;
    answer(&client, &address, &token, quiz_id, correct).await;

    let response = client
        .delete(format!("{}/api/v1/quizzes/{}", address, quiz_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    // Deleting again is a 404, the row is already inactive.
    let response = client
        .delete(format!("{}/api/v1/quizzes/{}", address, quiz_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .get(format!("{}/api/v1/quizzes/{}", address, quiz_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // The score row survives with its quiz reference intact.
    let (count, kept_quiz_id): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(quiz_id) FROM user_scores WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(kept_quiz_id, Some(quiz_id));
}

#[tokio::test]
async fn hard_delete_cascades_options_and_preserves_scores() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (user_id, token) = register(&client, &address, &unique_name("u")).await;

    let (quiz_id, correct, _) = seed_quiz(&pool, "Question").await;
    answer(&client, &address, &token, quiz_id, correct).await;

    // Schema-level removal, bypassing the API's soft delete.
    sqlx::query("DELETE FROM quiz_items WHERE id = $1")
        .bind(quiz_id)
        .execute(&pool)
        .await
        .unwrap();

    let options: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quiz_options WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(options, 0, "options must cascade with their quiz");

    let (scores, quiz_ref): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(quiz_id) FROM user_scores WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(scores, 1, "score history must survive");
    assert_eq!(quiz_ref, None, "quiz reference is nulled, not cascaded");

    let (answers, option_ref): (i64, Option<i64>) = sqlx::query_as(
        "SELECT COUNT(*), MAX(option_id) FROM user_answers WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(answers, 1, "answer history must survive");
    assert_eq!(option_ref, None);
}

#[tokio::test]
async fn leaderboard_is_sorted_by_total_score() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (_, token_a) = register(&client, &address, &unique_name("a")).await;
    let (_, token_b) = register(&client, &address, &unique_name("b")).await;

    let (quiz_1, correct_1, wrong_1) = seed_quiz(&pool, "Q1").await;
    let (quiz_2, correct_2, _) = seed_quiz(&pool, "Q2").await;

    // A: two correct answers. B: one wrong answer.
    answer(&client, &address, &token_a, quiz_1, correct_1).await;
    answer(&client, &address, &token_a, quiz_2, correct_2).await;
    answer(&client, &address, &token_b, quiz_1, wrong_1).await;

    let board: Vec<serde_json::Value> = client
        .get(format!("{}/api/v1/leaderboard", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(board.len() >= 2);
    let totals: Vec<f64> = board
        .iter()
        .map(|e| e["total_score"].as_f64().unwrap())
        .collect();
    for pair in totals.windows(2) {
        assert!(pair[0] >= pair[1], "totals must be non-increasing");
    }
    assert_eq!(board[0]["rank"], 1);
    assert_eq!(board[0]["total_score"], 20.0);
}

#[tokio::test]
async fn prediction_is_self_or_admin_only() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let (user_id, token) = register(&client, &address, &unique_name("u")).await;
    let (other_id, _) = register(&client, &address, &unique_name("v")).await;
    let admin_token = register_admin(&client, &address, &pool, &unique_name("adm")).await;

    let (quiz_id, correct, _) = seed_quiz(&pool, "Q").await;
    answer(&client, &address, &token, quiz_id, correct).await;

    // Self: average of one perfect answer maps to the easy shelf
    // (0.02 * 10.0 rounds to 0).
    let prediction: serde_json::Value = client
        .get(format!("{}/api/v1/predict-difficulty/{}", address, user_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(prediction["user_id"], user_id);
    assert_eq!(prediction["average_score"], 10.0);
    assert_eq!(prediction["recommended_difficulty"], "easy");

    // Another user's prediction is off limits.
    let response = client
        .get(format!("{}/api/v1/predict-difficulty/{}", address, other_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    // Admins can read anyone's.
    let response = client
        .get(format!("{}/api/v1/predict-difficulty/{}", address, user_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn stats_reflect_answer_history() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let (_, token) = register(&client, &address, &unique_name("u")).await;

    let (quiz_1, correct_1, _) = seed_quiz(&pool, "Q1").await;
    let (quiz_2, _, wrong_2) = seed_quiz(&pool, "Q2").await;

    answer(&client, &address, &token, quiz_1, correct_1).await;
    answer(&client, &address, &token, quiz_2, wrong_2).await;

    let stats: serde_json::Value = client
        .get(format!("{}/api/v1/users/me/stats", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(stats["total_score"], 10.0);
    assert_eq!(stats["quizzes_completed"], 2);
    assert_eq!(stats["accuracy"], 50.0);
    assert_eq!(stats["average_score"], 5.0);
}
