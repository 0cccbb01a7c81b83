//! Cache configuration
//!
//! Per-collection size limits and logging options, loaded from environment
//! variables (and a `.env` file when present).

use serde::Deserialize;
use std::env;

/// Size limits for the client-wide and per-guild collections
///
/// A limit of `None` means unbounded. `Some(0)` stores nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub guild_limit: Option<usize>,
    pub user_limit: Option<usize>,
    /// Initial limit of each guild's member collection
    pub member_limit: Option<usize>,
    /// Limit of each text channel's message collection
    pub message_limit: Option<usize>,
    pub private_channel_limit: Option<usize>,
    /// Granularity the member limit grows by when a batch overflows it
    pub member_limit_step: usize,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            guild_limit: None,
            user_limit: None,
            member_limit: None,
            message_limit: Some(default_message_limit()),
            private_channel_limit: None,
            member_limit_step: default_member_limit_step(),
            log_json: false,
        }
    }
}

// Default value functions
fn default_message_limit() -> usize {
    100
}

fn default_member_limit_step() -> usize {
    1000
}

impl CacheConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to something unparsable
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset variables keep defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limit = |key: &'static str, default: Option<usize>| {
            lookup(key).map_or(Ok(default), |value| parse_limit(key, &value))
        };

        Ok(Self {
            guild_limit: limit("MIRROR_GUILD_LIMIT", defaults.guild_limit)?,
            user_limit: limit("MIRROR_USER_LIMIT", defaults.user_limit)?,
            member_limit: limit("MIRROR_MEMBER_LIMIT", defaults.member_limit)?,
            message_limit: limit("MIRROR_MESSAGE_LIMIT", defaults.message_limit)?,
            private_channel_limit: limit(
                "MIRROR_PRIVATE_CHANNEL_LIMIT",
                defaults.private_channel_limit,
            )?,
            member_limit_step: match lookup("MIRROR_MEMBER_LIMIT_STEP") {
                Some(value) => parse_step(&value)?,
                None => defaults.member_limit_step,
            },
            log_json: match lookup("MIRROR_LOG_JSON") {
                Some(value) => parse_bool("MIRROR_LOG_JSON", &value)?,
                None => defaults.log_json,
            },
        })
    }
}

/// `unbounded`, `infinity` or an empty value mean no limit
fn parse_limit(key: &'static str, value: &str) -> Result<Option<usize>, ConfigError> {
    let value = value.trim();
    if value.is_empty()
        || value.eq_ignore_ascii_case("unbounded")
        || value.eq_ignore_ascii_case("infinity")
    {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue(key, value.to_string()))
}

fn parse_step(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse() {
        Ok(step) if step > 0 => Ok(step),
        _ => Err(ConfigError::InvalidValue(
            "MIRROR_MEMBER_LIMIT_STEP",
            value.to_string(),
        )),
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key, value.to_string())),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
