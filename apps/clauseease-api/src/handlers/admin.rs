use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;

use crate::auth::AuthUser;
use crate::db;
use crate::error::ApiError;
use crate::models::AdminStats;
use crate::state::AppState;

/// Usage statistics, for the `admin` account only
pub async fn stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<Json<AdminStats>, ApiError> {
    if !user.is_admin() {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }
    let stats = db::admin_stats(&state.db, Utc::now().date_naive()).await?;
    Ok(Json(stats))
}
