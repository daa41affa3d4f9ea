//! Registration, login, logout and the current user

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::auth::password::{
    hash_password, normalize_email, validate_email, validate_password_strength,
    validate_username, verify_password,
};
use crate::auth::{start_session, AuthUser};
use crate::db;
use crate::error::ApiError;
use crate::models::*;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Run password hashing on the blocking pool
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(e.into()))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let username = req.username.trim().to_string();
    let email = normalize_email(&req.email);

    validate_username(&username).map_err(ApiError::InvalidRequest)?;
    validate_email(&email).map_err(ApiError::InvalidRequest)?;
    validate_password_strength(&req.password).map_err(ApiError::InvalidRequest)?;

    if db::find_user_by_email(&state.db, &email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }
    if db::username_exists(&state.db, &username).await? {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let password = req.password;
    let password_hash = blocking(move || hash_password(&password))
        .await?
        .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))?;

    let created_at = db::timestamp(Utc::now());
    let user = db::create_user(&state.db, &username, &email, &password_hash, &created_at).await?;
    tracing::info!(user_id = user.id, %username, "Registered user");

    let token = start_session(&state, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = normalize_email(&req.email);
    let user = db::find_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let password = req.password;
    let hash = user.password_hash.clone();
    if !blocking(move || verify_password(&password, &hash)).await? {
        tracing::info!(user_id = user.id, "Rejected login");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = start_session(&state, &user).await?;
    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    db::delete_session(&state.db, &user.session_id).await?;
    tracing::info!(user_id = user.id, "Session ended");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let record = db::find_user_by_id(&state.db, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", user.id)))?;
    Ok(Json(record.into()))
}
