// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything that used to be a process-wide constant (signing secret, API
//! keys, upstream URLs) is read once at startup and injected into the
//! services that need it.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,

    // --- Storage ---
    /// sqlx connection string for the SQLite store
    pub database_url: String,
    /// Upper bound on pooled connections
    pub database_max_connections: u32,

    // --- Auth ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
    /// PBKDF2 rounds for newly hashed passwords
    pub password_hash_iterations: u32,

    // --- Upstream services ---
    /// Gemini API key; itinerary generation falls back locally without it
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
    /// Gemini REST base URL
    pub gemini_base_url: String,
    /// OpenRouteService API key
    pub ors_api_key: Option<String>,
    /// OpenRouteService base URL
    pub ors_base_url: String,
    /// Timeout applied to every outbound HTTP call
    pub http_timeout: Duration,
}

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEFAULT_DATABASE_URL: &str = "sqlite://travel_planner.db?mode=rwc";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_HASH_ITERATIONS: u32 = 100_000;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_ORS_BASE_URL: &str = "https://api.openrouteservice.org";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local
    /// development. Only `JWT_SIGNING_KEY` is mandatory.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.is_empty() {
            return Err(ConfigError::Invalid("JWT_SIGNING_KEY", "must not be empty".to_string()));
        }

        let token_ttl_hours = parse_or("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours < 1 {
            return Err(ConfigError::Invalid("TOKEN_TTL_HOURS", token_ttl_hours.to_string()));
        }

        Ok(Self {
            port: parse_or("PORT", DEFAULT_PORT)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            jwt_signing_key: jwt_signing_key.into_bytes(),
            token_ttl_hours,
            password_hash_iterations: parse_or(
                "PASSWORD_HASH_ITERATIONS",
                DEFAULT_HASH_ITERATIONS,
            )?,
            gemini_api_key: optional_secret("GEMINI_API_KEY"),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string()),
            ors_api_key: optional_secret("ORS_API_KEY"),
            ors_base_url: env::var("ORS_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_ORS_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(parse_or(
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        })
    }

    /// Default config for testing only.
    ///
    /// Upstream URLs point at a closed local port so nothing leaves the
    /// machine, and the hash iteration count is kept low.
    pub fn test_default() -> Self {
        Self {
            port: DEFAULT_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            password_hash_iterations: 1_000,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: "http://127.0.0.1:9".to_string(),
            ors_api_key: None,
            ors_base_url: "http://127.0.0.1:9".to_string(),
            http_timeout: Duration::from_secs(2),
        }
    }
}

/// Read a variable and parse it, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Secrets are optional; blank values count as unset.
fn optional_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env vars are process-global, so every assertion lives in one test.
    #[test]
    fn test_config_from_env() {
        env::remove_var("JWT_SIGNING_KEY");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Missing("JWT_SIGNING_KEY"))
        ));

        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("GEMINI_API_KEY", "   ");
        env::set_var("HTTP_TIMEOUT_SECS", "5");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.token_ttl_hours, 24);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(5));

        for ttl in ["soon", "0", "-3"] {
            env::set_var("TOKEN_TTL_HOURS", ttl);
            assert!(
                matches!(Config::from_env(), Err(ConfigError::Invalid("TOKEN_TTL_HOURS", _))),
                "accepted TOKEN_TTL_HOURS={}",
                ttl
            );
        }

        env::set_var("TOKEN_TTL_HOURS", "1");
        assert_eq!(Config::from_env().unwrap().token_ttl_hours, 1);

        env::remove_var("TOKEN_TTL_HOURS");
        env::remove_var("HTTP_TIMEOUT_SECS");
        env::remove_var("GEMINI_API_KEY");
    }
}
