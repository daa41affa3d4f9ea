//! Authentication: Argon2id passwords, HS256 tokens tied to server-side
//! sessions, and the [`AuthUser`] extractor for protected routes.

pub mod jwt;
pub mod password;

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::db;
use crate::error::ApiError;
use crate::models::{is_admin_username, DbUser};
use crate::state::AppState;

use self::jwt::{extract_bearer_token, generate_access_token, validate_access_token};

/// The caller of a protected route
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub session_id: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        is_admin_username(&self.username)
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let now = Utc::now();
        let claims = validate_access_token(&token, &state.jwt_secret, now.timestamp())
            .map_err(ApiError::Unauthorized)?;

        if !db::session_is_active(&state.db, &claims.sid, claims.sub, &db::timestamp(now)).await? {
            return Err(ApiError::Unauthorized("Session has ended".to_string()));
        }

        Ok(AuthUser {
            id: claims.sub,
            username: claims.username,
            session_id: claims.sid,
        })
    }
}

/// Open a session for `user` and return its access token
pub async fn start_session(state: &AppState, user: &DbUser) -> Result<String, ApiError> {
    let session_id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::seconds(jwt::ACCESS_TOKEN_EXPIRY);

    let purged = db::purge_expired_sessions(&state.db, user.id, &db::timestamp(now)).await?;
    if purged > 0 {
        tracing::debug!(user_id = user.id, purged, "Purged expired sessions");
    }

    db::create_session(
        &state.db,
        &session_id,
        user.id,
        &db::timestamp(now),
        &db::timestamp(expires_at),
    )
    .await?;

    tracing::info!(user_id = user.id, "Session started");

    generate_access_token(
        user.id,
        &user.username,
        &session_id,
        now.timestamp(),
        &state.jwt_secret,
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}
