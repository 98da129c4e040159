//! Axum route handlers for the Auth API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{password, token};
use crate::errors::AppError;
use crate::models::user::{UserProfile, UserRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// POST /api/auth/signup
///
/// Creates a user and issues a session token. A duplicate email fails with
/// an inline auth error and issues no token; the unique constraint on
/// `users.email` enforces this even under concurrent signups.
pub async fn handle_signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let username = request.username.trim();
    let email = request.email.trim().to_lowercase();

    if username.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "username, email and password are required".to_string(),
        ));
    }
    if !email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }

    let password_hash = password::hash_password(&request.password).map_err(AppError::Internal)?;

    let row: UserRow = sqlx::query_as(
        "INSERT INTO users (id, username, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&state.db)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::Auth("Email already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    tracing::info!("New signup: {}", row.id);

    let token = token::issue(row.id, &state.config.jwt_secret);
    Ok(Json(AuthResponse {
        token,
        user: row.into(),
    }))
}

/// POST /api/auth/signin
///
/// Verifies credentials and issues a session token.
pub async fn handle_signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = request.email.trim().to_lowercase();

    let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // Unknown email and wrong password produce the same client message.
    let row = row.ok_or_else(invalid_credentials)?;
    if !password::verify_password(&request.password, &row.password_hash) {
        return Err(invalid_credentials());
    }

    let token = token::issue(row.id, &state.config.jwt_secret);
    Ok(Json(AuthResponse {
        token,
        user: row.into(),
    }))
}

fn invalid_credentials() -> AppError {
    AppError::Auth("Invalid email or password".to_string())
}
