//! Application configuration from environment variables.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[from] serde_yaml::Error),
    #[error("invalid sources file: {0}")]
    SourcesFileInvalid(String),
}

/// Immutable run configuration, constructed once at startup and passed by
/// reference. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite URL, e.g. `sqlite://rxwatch.db`.
    pub database_url: String,
    pub sources_path: PathBuf,
    /// Listing items older than this date are not collected.
    pub start_date: NaiveDate,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; rxwatch/0.1; +https://github.com/rxwatch)";

/// Load configuration from environment variables, reading `.env` first.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Core parsing/validation, decoupled from the real environment so tests can
/// drive it with a plain closure — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default =
        |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_string());

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let start_date = or_default("RXWATCH_START_DATE", "2024-01-01");
    let start_date =
        NaiveDate::parse_from_str(&start_date, "%Y-%m-%d").map_err(|e| {
            ConfigError::InvalidEnvVar {
                var: "RXWATCH_START_DATE".to_string(),
                reason: e.to_string(),
            }
        })?;

    Ok(AppConfig {
        database_url: or_default("RXWATCH_DATABASE_URL", "sqlite://rxwatch.db"),
        sources_path: PathBuf::from(or_default("RXWATCH_SOURCES_PATH", "./config/sources.yaml")),
        start_date,
        request_timeout_secs: parse_u64("RXWATCH_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("RXWATCH_USER_AGENT", DEFAULT_USER_AGENT),
        max_retries: parse_u32("RXWATCH_MAX_RETRIES", "2")?,
        retry_backoff_base_secs: parse_u64("RXWATCH_RETRY_BACKOFF_BASE_SECS", "1")?,
    })
}
