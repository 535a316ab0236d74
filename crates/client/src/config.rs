use reqwest::Url;
use std::time::Duration;
use tracing::Level;
use train_r_core::ReconnectPolicy;
use train_r_core::reconnect::{DEFAULT_MAX_RECONNECT_DELAY, DEFAULT_RECONNECT_DELAY};

/// The endpoint the coaching server listens on in local development.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all client configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub ws_url: Url,
    pub reconnect: ReconnectPolicy,
    pub log_level: Level,
}

impl ClientConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let ws_url_str = std::env::var("COACH_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string());
        let ws_url = parse_ws_url(&ws_url_str)
            .map_err(|e| ConfigError::InvalidValue("COACH_WS_URL".to_string(), e))?;

        let delay = duration_ms_var("RECONNECT_DELAY_MS", DEFAULT_RECONNECT_DELAY)?;
        let max_delay = duration_ms_var("RECONNECT_MAX_DELAY_MS", DEFAULT_MAX_RECONNECT_DELAY)?;

        let backoff_str = std::env::var("RECONNECT_BACKOFF").unwrap_or_else(|_| "false".to_string());
        let backoff = match backoff_str.to_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "RECONNECT_BACKOFF".to_string(),
                    format!("'{}' is not a boolean", backoff_str),
                ));
            }
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            ws_url,
            reconnect: reconnect_policy(backoff, delay, max_delay),
            log_level,
        })
    }
}

/// Builds the reconnect policy from its configured parts.
pub fn reconnect_policy(backoff: bool, delay: Duration, max_delay: Duration) -> ReconnectPolicy {
    if backoff {
        ReconnectPolicy::ExponentialBackoff {
            initial: delay,
            max: max_delay.max(delay),
        }
    } else {
        ReconnectPolicy::Fixed { delay }
    }
}

/// Parses a WebSocket endpoint, accepting only `ws` and `wss` URLs.
pub fn parse_ws_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(format!("unsupported scheme '{}', expected ws or wss", other)),
    }
}

fn duration_ms_var(name: &str, default: Duration) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
