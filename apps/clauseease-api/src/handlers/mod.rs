//! HTTP handlers for the ClauseEase API

pub mod admin;
pub mod auth;
pub mod documents;
pub mod glossary;

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}
