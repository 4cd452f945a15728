//! Configuration module for environment variable parsing.
//!
//! The channel credentials are mandatory; everything else has a default.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

/// Default completion model, matching the AnythingLLM workspace the bot was built against.
pub const DEFAULT_COMPLETION_MODEL: &str = "Breeze Instruct 64K v01 7b Q2_k gguf";

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid URL in {name}: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// LINE channel access token, sent as bearer on every platform call
    pub channel_access_token: String,

    /// LINE channel secret used to verify `X-Line-Signature`
    pub channel_secret: String,

    /// Port for the web server to listen on
    pub port: u16,

    // =========================================================================
    // Completion endpoint
    // =========================================================================

    /// Full URL of the completion endpoint
    pub completion_url: Url,

    /// Optional bearer token for the completion endpoint
    pub completion_api_key: Option<String>,

    /// Model name sent with each request; omitted when `None`
    pub completion_model: Option<String>,

    pub completion_temperature: f32,

    pub completion_max_tokens: u32,

    /// Upper bound on a single completion call
    pub completion_timeout: Duration,

    // =========================================================================
    // Reply shaping
    // =========================================================================

    /// Maximum reply length in characters
    pub reply_max_chars: usize,

    /// Characters removed from generated text before replying
    pub reply_strip_chars: String,

    // =========================================================================
    // LINE platform
    // =========================================================================

    /// Base URL of the Messaging API
    pub line_api_base_url: Url,

    /// Timeout for reply and profile calls
    pub line_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let channel_access_token =
            non_empty("CHANNEL_ACCESS_TOKEN").ok_or(ConfigError::Missing("CHANNEL_ACCESS_TOKEN"))?;
        let channel_secret =
            non_empty("CHANNEL_SECRET").ok_or(ConfigError::Missing("CHANNEL_SECRET"))?;

        let completion_url = parse_url(
            "COMPLETION_URL",
            non_empty("COMPLETION_URL"),
            "http://localhost:3001/v1/completions",
        )?;

        let line_api_base_url = parse_url(
            "LINE_API_BASE_URL",
            non_empty("LINE_API_BASE_URL"),
            "https://api.line.me",
        )?;

        Ok(Config {
            channel_access_token,
            channel_secret,

            port: parse_or("PORT", lookup("PORT"), 5000),

            completion_url,

            // ANYTHINGLM_API_KEY (single L) is the name older deployments use
            completion_api_key: non_empty("COMPLETION_API_KEY")
                .or_else(|| non_empty("ANYTHINGLM_API_KEY"))
                .or_else(|| non_empty("ANYTHINGLLM_API_KEY")),

            completion_model: match lookup("COMPLETION_MODEL") {
                // Explicitly empty means "let the endpoint pick"
                Some(v) if v.trim().is_empty() => None,
                Some(v) => Some(v),
                None => Some(DEFAULT_COMPLETION_MODEL.to_string()),
            },

            completion_temperature: parse_or(
                "COMPLETION_TEMPERATURE",
                lookup("COMPLETION_TEMPERATURE"),
                0.5,
            ),

            completion_max_tokens: parse_or(
                "COMPLETION_MAX_TOKENS",
                lookup("COMPLETION_MAX_TOKENS"),
                500,
            ),

            completion_timeout: Duration::from_secs(parse_or(
                "COMPLETION_TIMEOUT_SECS",
                lookup("COMPLETION_TIMEOUT_SECS"),
                20,
            )),

            reply_max_chars: parse_or("REPLY_MAX_CHARS", lookup("REPLY_MAX_CHARS"), 5000),

            reply_strip_chars: lookup("REPLY_STRIP_CHARS").unwrap_or_else(|| "。".to_string()),

            line_api_base_url,

            line_timeout: Duration::from_secs(parse_or(
                "LINE_TIMEOUT_SECS",
                lookup("LINE_TIMEOUT_SECS"),
                10,
            )),
        })
    }
}

/// Parse an optional value, warning and falling back to the default when it is malformed.
fn parse_or<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}

fn parse_url(name: &'static str, raw: Option<String>, default: &str) -> Result<Url, ConfigError> {
    let raw = raw.unwrap_or_else(|| default.to_string());
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { name, source })
}
