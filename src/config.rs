/// Configuration management
use serde::Deserialize;

use crate::error::{AuthError, Result};

/// Minimum length for the signing secret. Shorter secrets make HS256
/// brute-forceable and are rejected at startup.
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Token signing secret. Required: there is deliberately no default.
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max_requests: u32,
    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_seconds: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite://authgate.db?mode=rwc".to_string()
}

fn default_token_ttl() -> i64 {
    3600 // 1 hour
}

fn default_rate_limit_max() -> u32 {
    10
}

fn default_rate_limit_window() -> u64 {
    60
}

impl Config {
    /// Load configuration from `AUTHGATE_`-prefixed environment variables.
    ///
    /// Fails fast if `AUTHGATE_JWT_SECRET` is absent or too short; the
    /// service never falls back to a built-in signing secret.
    pub fn from_env() -> Result<Self> {
        let config: Config = envy::prefixed("AUTHGATE_")
            .from_env()
            .map_err(|e| AuthError::Config(e.to_string()))?;

        if config.jwt_secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "AUTHGATE_JWT_SECRET must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env var mutations cannot race each other.
    #[test]
    fn secret_is_required_and_length_checked() {
        std::env::remove_var("AUTHGATE_JWT_SECRET");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));

        std::env::set_var("AUTHGATE_JWT_SECRET", "too-short");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AuthError::Config(_)));

        std::env::set_var(
            "AUTHGATE_JWT_SECRET",
            "an-adequately-long-signing-secret-for-tests",
        );
        let config = Config::from_env().unwrap();
        assert_eq!(config.token_ttl_secs, 3600);
        assert_eq!(config.server_port, 8000);
        std::env::remove_var("AUTHGATE_JWT_SECRET");
    }
}
