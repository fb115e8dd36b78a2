//! Store configuration, read from environment variables.
//!
//! # Environment Variables
//!
//! | Variable | Required | Default | Description |
//! |----------|----------|---------|-------------|
//! | `TODO_API_URL` | Yes | - | Base URL of the todo API (e.g., `http://localhost:3000`) |
//! | `TODO_ERROR_DISPLAY_MS` | No | 3000 | How long an error banner stays up |
//! | `TODO_REQUEST_TIMEOUT_SECS` | No | 30 | HTTP request timeout |

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default error banner lifetime in milliseconds.
pub const DEFAULT_ERROR_DISPLAY_MS: u64 = 3000;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const API_URL_VAR: &str = "TODO_API_URL";
const ERROR_DISPLAY_VAR: &str = "TODO_ERROR_DISPLAY_MS";
const REQUEST_TIMEOUT_VAR: &str = "TODO_REQUEST_TIMEOUT_SECS";

/// Errors that can occur during configuration parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Environment variable has an invalid value.
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Configuration for a [`crate::TodoStore`] backed by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the todo API.
    pub api_url: String,

    /// Delay before an error banner clears itself.
    pub error_display: Duration,

    /// Per-request timeout for the HTTP transport.
    pub request_timeout: Duration,
}

impl Config {
    /// Configuration with default timings for `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            error_display: Duration::from_millis(DEFAULT_ERROR_DISPLAY_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Creates a new `Config` by parsing environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `TODO_API_URL` is unset
    /// and [`ConfigError::InvalidValue`] when a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(API_URL_VAR.to_string()))?;

        let error_display_ms = parse_u64(&lookup, ERROR_DISPLAY_VAR, DEFAULT_ERROR_DISPLAY_MS)?;
        let timeout_secs = parse_u64(&lookup, REQUEST_TIMEOUT_VAR, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: REQUEST_TIMEOUT_VAR.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            api_url,
            error_display: Duration::from_millis(error_display_ms),
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a non-negative integer, got {raw:?}"),
        }),
    }
}
