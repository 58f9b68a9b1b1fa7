//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which model answers questions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QaBackend {
    /// The offline lexical model.
    Local,
    /// An OpenAI-compatible LLM.
    OpenAi { api_key: String, base_url: Option<String> },
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub qa_backend: QaBackend,
    pub qa_model: String,
    pub qa_min_score: f32,
    pub clear_transcript_on_upload: bool,
    pub max_upload_bytes: Option<usize>,
    pub cors_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        let max_upload_bytes = lookup("MAX_UPLOAD_BYTES")
            .map(|v| {
                v.trim().parse::<usize>().map_err(|e| {
                    ConfigError::InvalidValue("MAX_UPLOAD_BYTES".to_string(), e.to_string())
                })
            })
            .transpose()?;

        // --- Load Session Settings ---
        let clear_transcript_on_upload = lookup("CLEAR_TRANSCRIPT_ON_UPLOAD")
            .map(|v| parse_bool("CLEAR_TRANSCRIPT_ON_UPLOAD", &v))
            .transpose()?
            .unwrap_or(false);

        // --- Load QA Model Settings ---
        let backend_name = lookup("QA_BACKEND").unwrap_or_else(|| "local".to_string());
        let qa_backend = match backend_name.trim().to_lowercase().as_str() {
            "local" => QaBackend::Local,
            "openai" => QaBackend::OpenAi {
                api_key: lookup("OPENAI_API_KEY")
                    .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?,
                base_url: lookup("OPENAI_BASE_URL"),
            },
            other => {
                return Err(ConfigError::InvalidValue(
                    "QA_BACKEND".to_string(),
                    format!("'{}' is not one of: local, openai", other),
                ))
            }
        };
        let qa_model = lookup("QA_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        let qa_min_score = match lookup("QA_MIN_SCORE") {
            Some(v) => {
                let score = v.trim().parse::<f32>().map_err(|e| {
                    ConfigError::InvalidValue("QA_MIN_SCORE".to_string(), e.to_string())
                })?;
                if !(0.0..=1.0).contains(&score) {
                    return Err(ConfigError::InvalidValue(
                        "QA_MIN_SCORE".to_string(),
                        format!("{} is outside 0..=1", score),
                    ));
                }
                score
            }
            None => 0.2,
        };

        Ok(Self {
            bind_address,
            log_level,
            qa_backend,
            qa_model,
            qa_min_score,
            clear_transcript_on_upload,
            max_upload_bytes,
            cors_origin,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}
