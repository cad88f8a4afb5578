//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use std::env;
use std::time::Duration;

use crate::services::query::DEFAULT_CANDIDATE_CAP;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LIMIT: u32 = 50;
const DEFAULT_STORE_TIMEOUT_MS: u64 = 10_000;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID
    pub gcp_project_id: String,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Maximum entries fetched per leaderboard query or rank lookup
    pub candidate_cap: u32,
    /// Leaderboard size when the request does not give one
    pub default_limit: u32,
    /// Timeout applied to each store call
    pub store_timeout: Duration,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            port: DEFAULT_PORT,
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            default_limit: DEFAULT_LIMIT,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let config = Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: parse_var("PORT", DEFAULT_PORT)?,
            candidate_cap: parse_var("LEADERBOARD_CANDIDATE_CAP", DEFAULT_CANDIDATE_CAP)?,
            default_limit: parse_var("LEADERBOARD_DEFAULT_LIMIT", DEFAULT_LIMIT)?,
            store_timeout: Duration::from_millis(parse_var(
                "STORE_TIMEOUT_MS",
                DEFAULT_STORE_TIMEOUT_MS,
            )?),
        };

        if config.candidate_cap == 0 {
            return Err(ConfigError::Invalid("LEADERBOARD_CANDIDATE_CAP"));
        }
        if config.default_limit == 0 {
            return Err(ConfigError::Invalid("LEADERBOARD_DEFAULT_LIMIT"));
        }

        Ok(config)
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set env vars for test
        env::set_var("LEADERBOARD_CANDIDATE_CAP", "250");
        env::set_var("STORE_TIMEOUT_MS", "1500");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.candidate_cap, 250);
        assert_eq!(config.store_timeout, Duration::from_millis(1500));
        assert_eq!(config.default_limit, DEFAULT_LIMIT);

        env::set_var("LEADERBOARD_CANDIDATE_CAP", "lots");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("LEADERBOARD_CANDIDATE_CAP"))
        ));

        env::remove_var("LEADERBOARD_CANDIDATE_CAP");
        env::remove_var("STORE_TIMEOUT_MS");
    }
}
