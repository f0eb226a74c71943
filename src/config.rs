//! Environment-driven settings.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::SummarizationError;
use crate::llm::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// API key for the completion service.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Overrides the completion API base URL.
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";

/// Default model when `--model` is not given.
pub const MODEL_ENV_VAR: &str = "CHANGELOG_MODEL";

/// HTTP request timeout in seconds.
pub const TIMEOUT_ENV_VAR: &str = "DIFFLOG_TIMEOUT";

/// Default HTTP request timeout (2 minutes).
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Read the API key, treating an empty value as missing.
pub fn api_key() -> Result<String, SummarizationError> {
    match env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(SummarizationError::ApiKeyMissing),
    }
}

/// `--model`, then `CHANGELOG_MODEL`, then the built-in default.
pub fn resolve_model(cli_model: Option<&str>) -> String {
    if let Some(model) = cli_model.filter(|m| !m.trim().is_empty()) {
        return model.to_string();
    }
    match env::var(MODEL_ENV_VAR) {
        Ok(model) if !model.trim().is_empty() => model,
        _ => DEFAULT_MODEL.to_string(),
    }
}

pub fn base_url() -> String {
    match env::var(BASE_URL_ENV_VAR) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => DEFAULT_BASE_URL.to_string(),
    }
}

/// Get the configured HTTP timeout.
///
/// Logs a warning if the environment variable is set but contains an
/// invalid value (non-numeric or zero).
pub fn get_timeout() -> Duration {
    match env::var(TIMEOUT_ENV_VAR) {
        Ok(v) if !v.is_empty() => match v.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    "Invalid {} value '{}', using default {}s",
                    TIMEOUT_ENV_VAR, v, DEFAULT_TIMEOUT_SECS
                );
                Duration::from_secs(DEFAULT_TIMEOUT_SECS)
            }
        },
        _ => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
    }
}
