// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        company::{Company, CreateCompanyRequest, UpdateCompanyRequest},
        score::SystemStats,
        user::User,
    },
    utils::{hash::hash_password, jwt::Claims},
};

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    /// Substring match on username or email.
    pub q: Option<String>,
    /// Exact role filter ('user' or 'admin').
    pub role: Option<String>,
}

/// Lists all users, optionally filtered. Admin only.
pub async fn list_users(
    State(pool): State<SqlitePool>,
    Query(params): Query<UserListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut query_builder = QueryBuilder::<Sqlite>::new(
        r#"
        SELECT id, username, email, full_name, password_hash, role, phone, bio,
               company_id, created_at, is_active
        FROM users
        WHERE 1 = 1
        "#,
    );

    if let Some(q) = &params.q {
        let pattern = format!("%{}%", q);
        query_builder
            .push(" AND (username LIKE ")
            .push_bind(pattern.clone())
            .push(" OR email LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(role) = &params.role {
        query_builder.push(" AND role = ").push_bind(role);
    }
    query_builder.push(" ORDER BY id DESC");

    let users: Vec<User> = query_builder.build_query_as().fetch_all(&pool).await.map_err(|e| {
        tracing::error!("Failed to list users: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    Ok(Json(users))
}

fn validate_role(role: &str) -> Result<(), AppError> {
    if role != "user" && role != "admin" {
        return Err(AppError::BadRequest(
            "Role must be 'user' or 'admin'".to_string(),
        ));
    }
    Ok(())
}

/// DTO for Admin creating a user (can specify role).
#[derive(Debug, Deserialize, Validate)]
pub struct AdminCreateUserRequest {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username length must be between 3 and 50 characters."
    ))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    pub role: String, // 'user' or 'admin'
    pub company_id: Option<i64>,
}

/// Creates a new user with a specific role. Admin only.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    validate_role(&payload.role)?;

    let hashed_password = hash_password(&payload.password)?;

    let id = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, role, company_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&payload.username)
    .bind(&payload.email)
    .bind(&hashed_password)
    .bind(&payload.role)
    .bind(payload.company_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Conflict(format!("Username '{}' already exists", payload.username))
        } else {
            tracing::error!("Failed to create user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        }
    })?
    .last_insert_rowid();

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// DTO for updating a user. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct AdminUpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

/// Updates user information. Admin only.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Check existence
    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    // Perform updates sequentially if fields are present
    if let Some(new_username) = payload.username {
        sqlx::query("UPDATE users SET username = $1 WHERE id = $2")
            .bind(new_username)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    AppError::Conflict("Username already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
    }

    if let Some(new_email) = payload.email {
        sqlx::query("UPDATE users SET email = $1 WHERE id = $2")
            .bind(new_email)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    AppError::Conflict("Email already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
    }

    if let Some(new_role) = payload.role {
        validate_role(&new_role)?;
        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(new_role)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_password) = payload.password {
        let hashed = hash_password(&new_password)?;
        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(hashed)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(active) = payload.is_active {
        sqlx::query("UPDATE users SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(StatusCode::OK)
}

/// Deactivates a user by ID (soft delete). Admin only.
/// Prevents deactivating self.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let current_user_id = claims.user_id()?;
    if id == current_user_id {
        return Err(AppError::BadRequest("Cannot deactivate yourself".to_string()));
    }

    let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = $1 AND is_active = 1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to deactivate user: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

const COMPANY_COLUMNS: &str = "id, name, tax_id, email, phone, address, created_at, is_active";

/// Lists all active companies. Admin only.
pub async fn list_companies(
    State(pool): State<SqlitePool>,
) -> Result<impl IntoResponse, AppError> {
    let companies = sqlx::query_as::<_, Company>(&format!(
        "SELECT {COMPANY_COLUMNS} FROM companies WHERE is_active = 1 ORDER BY name"
    ))
    .fetch_all(&pool)
    .await?;

    Ok(Json(companies))
}

/// Creates a company. Admin only.
pub async fn create_company(
    State(pool): State<SqlitePool>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let id = sqlx::query(
        "INSERT INTO companies (name, tax_id, email, phone, address) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&payload.name)
    .bind(&payload.tax_id)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .execute(&pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint") {
            AppError::Conflict(format!("Company '{}' already exists", payload.name))
        } else {
            AppError::from(e)
        }
    })?
    .last_insert_rowid();

    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// Partially updates a company. Admin only.
pub async fn update_company(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    if let Some(name) = payload.name {
        sqlx::query("UPDATE companies SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(&pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    AppError::Conflict("Company name already exists".to_string())
                } else {
                    AppError::from(e)
                }
            })?;
    }

    if let Some(tax_id) = payload.tax_id {
        sqlx::query("UPDATE companies SET tax_id = $1 WHERE id = $2")
            .bind(tax_id)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(email) = payload.email {
        sqlx::query("UPDATE companies SET email = $1 WHERE id = $2")
            .bind(email)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(phone) = payload.phone {
        sqlx::query("UPDATE companies SET phone = $1 WHERE id = $2")
            .bind(phone)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(address) = payload.address {
        sqlx::query("UPDATE companies SET address = $1 WHERE id = $2")
            .bind(address)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(StatusCode::OK)
}

/// Deactivates a company (soft delete). Admin only.
pub async fn delete_company(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("UPDATE companies SET is_active = 0 WHERE id = $1 AND is_active = 1")
        .bind(id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Company not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, sqlx::FromRow)]
struct StatsRow {
    total_users: i64,
    active_users: i64,
    active_quizzes: i64,
    total_attempts: i64,
}

/// System-wide counters for the administration page. Admin only.
pub async fn system_stats(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let row = sqlx::query_as::<_, StatsRow>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM users WHERE is_active = 1) AS active_users,
            (SELECT COUNT(*) FROM quiz_items WHERE is_active = 1) AS active_quizzes,
            (SELECT COUNT(*) FROM user_scores) AS total_attempts
        "#,
    )
    .fetch_one(&pool)
    .await?;

    Ok(Json(SystemStats {
        total_users: row.total_users,
        active_users: row.active_users,
        active_quizzes: row.active_quizzes,
        total_attempts: row.total_attempts,
    }))
}
