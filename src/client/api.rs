// src/client/api.rs

use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::models::{
    dimension::{Difficulty, Topic},
    quiz::{AnswerRequest, AnswerResponse, CreateQuizRequest, QuizDetail},
    score::{
        Activity, LeaderboardEntry, PredictionResponse, ScoreEntry, SubmitScoreRequest,
        SystemStats, UserStats,
    },
    user::{AuthResponse, CreateUserRequest, LoginRequest, UpdateProfileRequest, User},
};

use super::session::Session;

/// Fixed per-request timeout. No retries.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper around the backend REST API.
///
/// Every page goes through here. The wrapper attaches the session's bearer
/// token, maps connection failures and timeouts to user-facing messages,
/// and treats a 401 as the end of the request cycle: the session's auth
/// state is cleared exactly once and no further requests are attempted
/// with the stale token. Callers receive `None` for "data unavailable"
/// and degrade to empty views.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Issues one request against a relative endpoint.
    ///
    /// Returns the raw response, or `None` when the request could not be
    /// made or the cycle was already halted by an earlier 401.
    async fn send(
        &self,
        session: &mut Session,
        method: Method,
        endpoint: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Option<Response> {
        if session.is_halted() {
            return None;
        }

        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self.http.request(method, &url);
        if let Some(token) = session.token() {
            request = request.bearer_auth(token);
        }
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        match request.send().await {
            Ok(response) if response.status() == StatusCode::UNAUTHORIZED => {
                if session.is_authenticated() {
                    session.clear_auth();
                }
                session.halt();
                session.push_message("Session expired. Please log in again.");
                None
            }
            Ok(response) => Some(response),
            Err(e) if e.is_timeout() => {
                session.push_message("The request took too long to respond.");
                None
            }
            Err(e) if e.is_connect() => {
                session
                    .push_message("The backend API is not reachable. Please start the server.");
                None
            }
            Err(e) => {
                session.push_message(format!("Request failed: {e}"));
                None
            }
        }
    }

    /// Sends and decodes a JSON response body. Non-success statuses are
    /// converted to a session message and `None`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        method: Method,
        endpoint: &str,
        query: Option<&[(&str, String)]>,
        body: Option<&Value>,
    ) -> Option<T> {
        let response = self.send(session, method, endpoint, query, body).await?;

        if response.status().is_success() {
            match response.json::<T>().await {
                Ok(value) => Some(value),
                Err(e) => {
                    session.push_message(format!("Unexpected response format: {e}"));
                    None
                }
            }
        } else {
            session.push_message(Self::error_body(response).await);
            None
        }
    }

    /// Sends a request whose success carries no body the caller needs.
    /// Non-success statuses queue the error body as a session message,
    /// same as `fetch`.
    async fn execute(
        &self,
        session: &mut Session,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> bool {
        let Some(response) = self.send(session, method, endpoint, None, body).await else {
            return false;
        };

        if response.status().is_success() {
            true
        } else {
            session.push_message(Self::error_body(response).await);
            false
        }
    }

    /// Extracts the backend's `error`/`detail` message from a failed
    /// response, falling back to a generic line for bodyless failures.
    async fn error_body(response: Response) -> String {
        response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| {
                v.get("error")
                    .or_else(|| v.get("detail"))
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "Request failed.".to_string())
    }

    fn to_value<T: serde::Serialize>(body: &T) -> Option<Value> {
        serde_json::to_value(body).ok()
    }

    // ----- auth -----

    /// Logs in and stores token + profile on success.
    pub async fn login(&self, session: &mut Session, username: &str, password: &str) -> bool {
        let payload = Self::to_value(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        });

        let auth: Option<AuthResponse> = self
            .fetch(session, Method::POST, "/login", None, payload.as_ref())
            .await;

        match auth {
            Some(auth) => {
                session.store_auth(auth.access_token, auth.user);
                true
            }
            None => false,
        }
    }

    /// Registers a new account; a successful registration logs in.
    pub async fn register(&self, session: &mut Session, request: &CreateUserRequest) -> bool {
        let payload = Self::to_value(request);

        let auth: Option<AuthResponse> = self
            .fetch(session, Method::POST, "/register", None, payload.as_ref())
            .await;

        match auth {
            Some(auth) => {
                session.store_auth(auth.access_token, auth.user);
                true
            }
            None => false,
        }
    }

    // ----- profile -----

    pub async fn me(&self, session: &mut Session) -> Option<User> {
        self.fetch(session, Method::GET, "/users/me", None, None).await
    }

    pub async fn update_me(
        &self,
        session: &mut Session,
        request: &UpdateProfileRequest,
    ) -> Option<User> {
        let payload = Self::to_value(request);
        let user: Option<User> = self
            .fetch(session, Method::PUT, "/users/me", None, payload.as_ref())
            .await;

        if let Some(user) = &user {
            session.update_user(user.clone());
        }
        user
    }

    pub async fn my_stats(&self, session: &mut Session) -> Option<UserStats> {
        self.fetch(session, Method::GET, "/users/me/stats", None, None)
            .await
    }

    pub async fn my_scores(&self, session: &mut Session) -> Option<Vec<ScoreEntry>> {
        self.fetch(session, Method::GET, "/users/me/scores", None, None)
            .await
    }

    pub async fn my_activities(
        &self,
        session: &mut Session,
        limit: i64,
    ) -> Option<Vec<Activity>> {
        let query = [("limit", limit.to_string())];
        self.fetch(session, Method::GET, "/users/me/activities", Some(&query), None)
            .await
    }

    // ----- quizzes -----

    pub async fn quizzes(
        &self,
        session: &mut Session,
        topic: Option<&str>,
        difficulty: Option<&str>,
    ) -> Option<Vec<QuizDetail>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(topic) = topic {
            query.push(("topic", topic.to_string()));
        }
        if let Some(difficulty) = difficulty {
            query.push(("difficulty", difficulty.to_string()));
        }
        self.fetch(session, Method::GET, "/quizzes", Some(&query), None)
            .await
    }

    pub async fn available_quizzes(
        &self,
        session: &mut Session,
        limit: Option<i64>,
    ) -> Option<Vec<QuizDetail>> {
        let query: Vec<(&str, String)> = limit
            .map(|l| vec![("limit", l.to_string())])
            .unwrap_or_default();
        self.fetch(session, Method::GET, "/quizzes/available", Some(&query), None)
            .await
    }

    pub async fn quiz(&self, session: &mut Session, id: i64) -> Option<QuizDetail> {
        self.fetch(session, Method::GET, &format!("/quizzes/{id}"), None, None)
            .await
    }

    pub async fn create_quiz(
        &self,
        session: &mut Session,
        request: &CreateQuizRequest,
    ) -> Option<QuizDetail> {
        let payload = Self::to_value(request);
        self.fetch(session, Method::POST, "/quizzes", None, payload.as_ref())
            .await
    }

    pub async fn delete_quiz(&self, session: &mut Session, id: i64) -> bool {
        self.execute(session, Method::DELETE, &format!("/quizzes/{id}"), None)
            .await
    }

    pub async fn answer(
        &self,
        session: &mut Session,
        quiz_id: i64,
        option_id: i64,
    ) -> Option<AnswerResponse> {
        let payload = Self::to_value(&AnswerRequest { option_id });
        self.fetch(
            session,
            Method::POST,
            &format!("/quizzes/{quiz_id}/answer"),
            None,
            payload.as_ref(),
        )
        .await
    }

    pub async fn submit_score(&self, session: &mut Session, quiz_id: i64, score: f64) -> bool {
        let payload = Self::to_value(&SubmitScoreRequest { quiz_id, score });
        self.execute(session, Method::POST, "/submit-score", payload.as_ref())
            .await
    }

    pub async fn topics(&self, session: &mut Session) -> Option<Vec<Topic>> {
        self.fetch(session, Method::GET, "/topics", None, None).await
    }

    pub async fn difficulties(&self, session: &mut Session) -> Option<Vec<Difficulty>> {
        self.fetch(session, Method::GET, "/difficulties", None, None)
            .await
    }

    // ----- ranking & prediction -----

    pub async fn leaderboard(
        &self,
        session: &mut Session,
        limit: Option<i64>,
    ) -> Option<Vec<LeaderboardEntry>> {
        let query: Vec<(&str, String)> = limit
            .map(|l| vec![("limit", l.to_string())])
            .unwrap_or_default();
        self.fetch(session, Method::GET, "/leaderboard", Some(&query), None)
            .await
    }

    pub async fn predict_difficulty(
        &self,
        session: &mut Session,
        user_id: i64,
    ) -> Option<PredictionResponse> {
        self.fetch(
            session,
            Method::GET,
            &format!("/predict-difficulty/{user_id}"),
            None,
            None,
        )
        .await
    }

    // ----- administration -----

    pub async fn admin_users(
        &self,
        session: &mut Session,
        search: Option<&str>,
        role: Option<&str>,
    ) -> Option<Vec<User>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(search) = search {
            query.push(("q", search.to_string()));
        }
        if let Some(role) = role {
            query.push(("role", role.to_string()));
        }
        self.fetch(session, Method::GET, "/admin/users", Some(&query), None)
            .await
    }

    pub async fn admin_create_user(
        &self,
        session: &mut Session,
        username: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> bool {
        let payload = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
            "role": role,
        });
        self.execute(session, Method::POST, "/admin/users", Some(&payload))
            .await
    }

    /// Partial user update; absent fields are left untouched.
    pub async fn admin_update_user(
        &self,
        session: &mut Session,
        id: i64,
        role: Option<&str>,
        password: Option<&str>,
        is_active: Option<bool>,
    ) -> bool {
        let mut payload = serde_json::Map::new();
        if let Some(role) = role {
            payload.insert("role".to_string(), role.into());
        }
        if let Some(password) = password {
            payload.insert("password".to_string(), password.into());
        }
        if let Some(is_active) = is_active {
            payload.insert("is_active".to_string(), is_active.into());
        }
        let payload = Value::Object(payload);

        self.execute(
            session,
            Method::PUT,
            &format!("/admin/users/{id}"),
            Some(&payload),
        )
        .await
    }

    pub async fn admin_deactivate_user(&self, session: &mut Session, id: i64) -> bool {
        self.execute(session, Method::DELETE, &format!("/admin/users/{id}"), None)
            .await
    }

    pub async fn admin_stats(&self, session: &mut Session) -> Option<SystemStats> {
        self.fetch(session, Method::GET, "/admin/stats", None, None)
            .await
    }
}
