//! ClauseEase API server
//!
//! Provides REST endpoints for:
//! - Account registration, login and logout
//! - Contract upload and analysis (PDF, DOCX, TXT)
//! - Document history, reports and JSON report download
//! - The legal term glossary
//! - Admin usage statistics

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

/// Largest accepted request body (uploads included)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Build the application router, optionally serving a static dashboard at `/`
pub fn build_router(state: Arc<AppState>, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Accounts
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        // Documents
        .route(
            "/api/documents",
            get(handlers::documents::list_documents).post(handlers::documents::upload_document),
        )
        .route(
            "/api/documents/:id",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route(
            "/api/documents/:id/report",
            get(handlers::documents::download_report),
        )
        // Reference data and admin
        .route("/api/glossary", get(handlers::glossary::list_glossary))
        .route("/api/admin/stats", get(handlers::admin::stats));

    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
