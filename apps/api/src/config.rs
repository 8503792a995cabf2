use std::time::Duration;

use anyhow::{Context, Result};

use crate::credentials::{CredentialDefaults, DEFAULT_BASE_URL};

/// Application configuration loaded from environment variables.
/// Only the port must parse; every other value has a default.
#[derive(Clone)]
pub struct Config {
    /// System default key, used when a session has not supplied its own.
    pub default_api_key: Option<String>,
    pub default_base_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Sessions idle for longer than this are dropped.
    pub session_ttl: Duration,
    pub session_sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            default_api_key: optional_env("DEEPSEEK_API_KEY"),
            default_base_url: optional_env("DEEPSEEK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_ttl: Duration::from_secs(
                minutes_env("SESSION_TTL_MINUTES", 120)? * 60,
            ),
            session_sweep_interval: Duration::from_secs(
                minutes_env("SESSION_SWEEP_MINUTES", 5)? * 60,
            ),
        })
    }

    pub fn credential_defaults(&self) -> CredentialDefaults {
        CredentialDefaults {
            api_key: self.default_api_key.clone(),
            base_url: self.default_base_url.clone(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("default_api_key", &self.default_api_key.as_ref().map(|_| "<redacted>"))
            .field("default_base_url", &self.default_base_url)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .field("session_ttl", &self.session_ttl)
            .field("session_sweep_interval", &self.session_sweep_interval)
            .finish()
    }
}

/// Reads an env var, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads a positive whole number of minutes, falling back to `default`.
fn minutes_env(key: &str, default: u64) -> Result<u64> {
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => {
            let minutes = raw
                .parse::<u64>()
                .with_context(|| format!("{key} must be a whole number of minutes"))?;
            anyhow::ensure!(minutes > 0, "{key} must be greater than zero");
            Ok(minutes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_env_default_and_parse() {
        assert_eq!(minutes_env("QUILL_TEST_UNSET_MINUTES", 7).unwrap(), 7);

        std::env::set_var("QUILL_TEST_TTL_MINUTES", " 30 ");
        assert_eq!(minutes_env("QUILL_TEST_TTL_MINUTES", 7).unwrap(), 30);

        std::env::set_var("QUILL_TEST_ZERO_MINUTES", "0");
        assert!(minutes_env("QUILL_TEST_ZERO_MINUTES", 7).is_err());

        std::env::set_var("QUILL_TEST_BAD_MINUTES", "soon");
        assert!(minutes_env("QUILL_TEST_BAD_MINUTES", 7).is_err());
    }
}
