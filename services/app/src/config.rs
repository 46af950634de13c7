//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The
//! `.env` file is used for local development.

use std::path::PathBuf;
use tracing::Level;

use copilot_core::upload::DEFAULT_MAX_UPLOAD_BYTES;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the course backend, without a trailing slash.
    pub backend_url: String,
    pub log_level: Level,
    /// Per-file upload cap in bytes.
    pub max_upload_bytes: u64,
    /// Optional JSON roster of accounts; the seeded demo roster is used
    /// when absent.
    pub roster_path: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for
    /// development, but this is skipped in test environments to keep tests
    /// hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let backend_url = std::env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .trim_end_matches('/')
            .to_string();
        if backend_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "BACKEND_URL".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let max_upload_bytes = match std::env::var("UPLOAD_LIMIT_MB") {
            Ok(raw) => {
                let megabytes = raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "UPLOAD_LIMIT_MB".to_string(),
                        format!("'{}' is not a whole number of megabytes", raw),
                    )
                })?;
                if megabytes == 0 {
                    return Err(ConfigError::InvalidValue(
                        "UPLOAD_LIMIT_MB".to_string(),
                        "must be at least 1".to_string(),
                    ));
                }
                megabytes * 1024 * 1024
            }
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let roster_path = std::env::var("ROSTER_PATH").map(PathBuf::from).ok();

        Ok(Self {
            backend_url,
            log_level,
            max_upload_bytes,
            roster_path,
        })
    }
}
