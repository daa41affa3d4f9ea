//! Runtime configuration from the environment (and `.env`)

use std::path::PathBuf;

use anyhow::Result;
use clause_engine::DEFAULT_INFERENCE_URL;

use crate::state::dirs;

pub const DEFAULT_PORT: u16 = 3001;

/// Only for local development; set `JWT_SECRET` in any real deployment
const DEV_JWT_SECRET: &str = "clauseease-development-secret-change-me";

/// Hosted inference settings, enabled when `CLAUSEEASE_INFERENCE_URL` or
/// `HF_API_TOKEN` is set
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub clause_model: Option<String>,
    pub simplifier_model: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub static_dir: Option<PathBuf>,
    pub inference: Option<InferenceConfig>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating empty values as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => default_database_url()?,
        };

        let port = match get("PORT") {
            Some(p) => p
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PORT {:?}: {}", p, e))?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let token = get("HF_API_TOKEN");
        let inference = match (get("CLAUSEEASE_INFERENCE_URL"), token.is_some()) {
            (Some(base_url), _) => Some(base_url),
            (None, true) => Some(DEFAULT_INFERENCE_URL.to_string()),
            (None, false) => None,
        }
        .map(|base_url| InferenceConfig {
            base_url,
            token,
            clause_model: get("CLAUSE_MODEL"),
            simplifier_model: get("SIMPLIFIER_MODEL"),
        });

        Ok(Self {
            database_url,
            port,
            jwt_secret,
            static_dir: get("STATIC_DIR").map(PathBuf::from),
            inference,
        })
    }
}

fn default_database_url() -> Result<String> {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clauseease");
    std::fs::create_dir_all(&data_dir)?;
    Ok(format!(
        "sqlite:{}?mode=rwc",
        data_dir.join("clauseease.db").display()
    ))
}
