// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, leaderboard, ml, profile, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, profile, leaderboard, admin).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let profile_routes = Router::new()
        .route("/users/me", get(profile::get_me).put(profile::update_me))
        .route("/users/me/stats", get(profile::my_stats))
        .route("/users/me/scores", get(profile::my_scores))
        .route("/users/me/activities", get(profile::my_activities))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let quiz_routes = Router::new()
        .route("/quizzes", get(quiz::list_quizzes))
        .route("/quizzes/{id}", get(quiz::get_quiz))
        .route("/topics", get(quiz::list_topics))
        .route("/difficulties", get(quiz::list_difficulties))
        .route("/leaderboard", get(leaderboard::get_leaderboard))
        // Protected quiz routes
        .merge(
            Router::new()
                .route("/quizzes", post(quiz::create_quiz))
                .route("/quizzes/available", get(quiz::available_quizzes))
                .route("/quizzes/{id}/answer", post(quiz::answer_quiz))
                .route("/submit-score", post(quiz::submit_score))
                .route("/predict-difficulty/{user_id}", get(ml::predict_difficulty))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        // Admin-only quiz management
        .merge(
            Router::new()
                .route(
                    "/quizzes/{id}",
                    put(quiz::update_quiz).delete(quiz::delete_quiz),
                )
                .layer(middleware::from_fn(admin_middleware))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        );

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route(
            "/companies",
            get(admin::list_companies).post(admin::create_company),
        )
        .route(
            "/companies/{id}",
            put(admin::update_company).delete(admin::delete_company),
        )
        .route("/stats", get(admin::system_stats))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .merge(auth_routes)
        .merge(profile_routes)
        .merge(quiz_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api/v1", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
