//! Configuration loading from environment variables.
//!
//! All configuration is loaded from environment variables at startup.
//! Missing required variables cause immediate failure with clear error messages.

use std::env;

use dashcfg_api_versions::{VersionsSettings, DEFAULT_KEEP_COUNT, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use dashcfg_db::pool::DEFAULT_MAX_CONNECTIONS;
use thiserror::Error;

/// Header carrying the authenticated user id, set by the gateway in front of this service.
pub const DEFAULT_CALLER_HEADER: &str = "X-User-ID";

/// Configuration errors that can occur during environment loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection string.
    pub database_url: String,

    /// Server bind host (default: 0.0.0.0).
    pub host: String,

    /// Server bind port (default: 8080).
    pub port: u16,

    /// Log filter directive (default: "info,dashcfg=debug").
    pub rust_log: String,

    /// Maximum database connections (default: 10).
    pub db_max_connections: u32,

    /// Versions kept per configuration, at least 1 (default: 20).
    pub retention_count: usize,

    /// History page size when a request gives no limit (default: 20, max: 100).
    pub history_page_size: usize,

    /// Apply embedded migrations at startup (default: true).
    pub run_migrations: bool,

    /// Request header holding the caller's user id.
    pub caller_header: String,
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `DATABASE_URL` is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port: u16 = parse_var(&lookup, "PORT", 8080)?;
        if port == 0 {
            return Err(ConfigError::InvalidValue {
                var: "PORT".to_string(),
                message: "Port must be between 1 and 65535".to_string(),
            });
        }

        let rust_log = lookup("RUST_LOG").unwrap_or_else(|| "info,dashcfg=debug".to_string());

        let db_max_connections: u32 =
            parse_var(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        if db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                var: "DB_MAX_CONNECTIONS".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        let retention_count: usize =
            parse_var(&lookup, "VERSION_RETENTION_COUNT", DEFAULT_KEEP_COUNT)?;
        if retention_count == 0 {
            return Err(ConfigError::InvalidValue {
                var: "VERSION_RETENTION_COUNT".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        let history_page_size: usize =
            parse_var(&lookup, "VERSION_HISTORY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if !(1..=MAX_PAGE_SIZE).contains(&history_page_size) {
            return Err(ConfigError::InvalidValue {
                var: "VERSION_HISTORY_PAGE_SIZE".to_string(),
                message: format!("Must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        let run_migrations = match lookup("RUN_MIGRATIONS") {
            None => true,
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::InvalidValue {
                var: "RUN_MIGRATIONS".to_string(),
                message: format!("Expected true or false, got '{value}'"),
            })?,
        };

        let caller_header =
            lookup("CALLER_ID_HEADER").unwrap_or_else(|| DEFAULT_CALLER_HEADER.to_string());

        Ok(Self {
            database_url,
            host,
            port,
            rust_log,
            db_max_connections,
            retention_count,
            history_page_size,
            run_migrations,
            caller_header,
        })
    }

    /// Get the server bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn versions_settings(&self) -> VersionsSettings {
        VersionsSettings {
            page_size: self.history_page_size,
            keep_count: self.retention_count,
        }
    }
}

fn parse_var<F, T>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            var: var.to_string(),
            message: e.to_string(),
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
