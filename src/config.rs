use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::sync_service::DEFAULT_MAX_PAGES;

pub const DEFAULT_LIST_URL: &str = "https://api.karenai.click/swechallenge/list";
pub const DEFAULT_ACTIVATION_URL: &str = "https://api.karenai.click/swechallenge/login";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub list_url: String,
    pub activation_url: String,
    pub api_token: String,
    pub activation_timeout: Duration,
    pub list_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub enabled: bool,
    pub interval: Duration,
    pub max_pages: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub upstream: UpstreamConfig,
    pub sync: SyncConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173,http://127.0.0.1:5173".to_string())
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        let upstream = UpstreamConfig {
            list_url: lookup("UPSTREAM_LIST_URL").unwrap_or_else(|| DEFAULT_LIST_URL.to_string()),
            activation_url: lookup("UPSTREAM_ACTIVATION_URL")
                .unwrap_or_else(|| DEFAULT_ACTIVATION_URL.to_string()),
            api_token: lookup("UPSTREAM_API_TOKEN").unwrap_or_default(),
            activation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "UPSTREAM_ACTIVATION_TIMEOUT_SECS",
                10,
            )?),
            list_timeout: Duration::from_secs(parse_or(&lookup, "UPSTREAM_LIST_TIMEOUT_SECS", 15)?),
        };

        let sync = SyncConfig {
            enabled: parse_or(&lookup, "SYNC_ENABLED", true)?,
            interval: Duration::from_secs(parse_or(&lookup, "SYNC_INTERVAL_SECS", 3600)?),
            max_pages: parse_or(&lookup, "SYNC_MAX_PAGES", DEFAULT_MAX_PAGES)?,
        };

        if sync.interval.is_zero() {
            return Err(ConfigError::Invalid {
                key: "SYNC_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            port: parse_or(&lookup, "SERVER_PORT", 8081)?,
            cors_allowed_origins,
            upstream,
            sync,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}
