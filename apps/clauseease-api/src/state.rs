//! Application state for the ClauseEase API

use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use clause_engine::Pipeline;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::Config;

pub struct AppState {
    pub db: SqlitePool,
    pub pipeline: Arc<Pipeline>,
    pub jwt_secret: String,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let pipeline = build_pipeline(config).await?;
        Self::from_pool(pool, pipeline, config.jwt_secret.clone()).await
    }

    /// Wrap an existing pool, running migrations first
    pub async fn from_pool(
        pool: SqlitePool,
        pipeline: Pipeline,
        jwt_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::run_migrations(&pool).await?;
        Ok(Self {
            db: pool,
            pipeline: Arc::new(pipeline),
            jwt_secret: jwt_secret.into(),
        })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                filename TEXT NOT NULL,
                format TEXT NOT NULL,
                simplification_level TEXT NOT NULL,
                raw_text TEXT NOT NULL,
                simplified_text TEXT NOT NULL,
                word_count INTEGER NOT NULL,
                clause_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_documents_user ON documents(user_id, created_at)
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clauses (
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                clause_index INTEGER NOT NULL,
                category TEXT NOT NULL,
                original_text TEXT NOT NULL,
                cleaned_text TEXT NOT NULL,
                sentences_json TEXT NOT NULL,
                simplified_text TEXT NOT NULL,
                PRIMARY KEY (document_id, clause_index)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_terms (
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                position INTEGER NOT NULL,
                term TEXT NOT NULL,
                category TEXT NOT NULL,
                definition TEXT NOT NULL,
                occurrences INTEGER NOT NULL,
                PRIMARY KEY (document_id, position)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS readability_reports (
                document_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
                kind TEXT NOT NULL CHECK (kind IN ('original', 'simplified')),
                sentence_count INTEGER NOT NULL,
                word_count INTEGER NOT NULL,
                syllable_count INTEGER NOT NULL,
                complex_word_count INTEGER NOT NULL,
                avg_words_per_sentence REAL NOT NULL,
                avg_syllables_per_word REAL NOT NULL,
                flesch_reading_ease REAL NOT NULL,
                flesch_kincaid_grade REAL NOT NULL,
                PRIMARY KEY (document_id, kind)
            )
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Migrations complete");
        Ok(())
    }
}

/// Pick the analysis backends: hosted models when configured (and compiled
/// in), otherwise the built-in rules
#[cfg(feature = "hosted")]
pub async fn build_pipeline(config: &Config) -> Result<Pipeline> {
    use clause_engine::hosted::{
        HostedClassifier, HostedSimplifier, InferenceClient, DEFAULT_CLAUSE_MODEL,
        DEFAULT_SIMPLIFIER_MODEL,
    };

    let Some(inference) = config.inference.clone() else {
        return Ok(Pipeline::rule_based());
    };

    // The blocking HTTP client owns a runtime of its own and cannot be built on this one
    let pipeline = tokio::task::spawn_blocking(move || -> Result<Pipeline> {
        let client = Arc::new(InferenceClient::new(inference.base_url.clone(), inference.token)?);
        let clause_model = inference
            .clause_model
            .unwrap_or_else(|| DEFAULT_CLAUSE_MODEL.to_string());
        let simplifier_model = inference
            .simplifier_model
            .unwrap_or_else(|| DEFAULT_SIMPLIFIER_MODEL.to_string());
        tracing::info!(
            endpoint = %inference.base_url,
            %clause_model,
            %simplifier_model,
            "Using hosted inference"
        );
        Ok(Pipeline::new(
            Box::new(HostedClassifier::new(client.clone(), clause_model)),
            Box::new(HostedSimplifier::new(client, simplifier_model)),
        ))
    })
    .await??;
    Ok(pipeline)
}

#[cfg(not(feature = "hosted"))]
pub async fn build_pipeline(config: &Config) -> Result<Pipeline> {
    if config.inference.is_some() {
        tracing::warn!("Inference settings ignored: built without the `hosted` feature");
    }
    Ok(Pipeline::rule_based())
}

/// Get platform-specific data directory
pub(crate) mod dirs {
    use std::path::PathBuf;

    pub fn data_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(target_os = "windows")]
        {
            std::env::var("APPDATA").ok().map(PathBuf::from)
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }
}
