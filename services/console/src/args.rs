use anyhow::{Result, anyhow};
use clap::Parser;
use train_r_client::config::{ClientConfig, parse_ws_url, reconnect_policy};
use train_r_core::ReconnectPolicy;
use train_r_core::reconnect::DEFAULT_MAX_RECONNECT_DELAY;

/// Terminal client for the Train-R cycling coach.
#[derive(Parser, Debug)]
#[command(name = "train-r-console", version, about)]
pub struct Args {
    /// WebSocket endpoint of the coaching server. Overrides COACH_WS_URL.
    #[arg(long)]
    pub url: Option<String>,

    /// Back off exponentially between reconnect attempts instead of using a fixed delay.
    #[arg(long)]
    pub backoff: bool,

    /// Query the server's health endpoint and exit.
    #[arg(long)]
    pub health: bool,
}

impl Args {
    /// Applies command-line overrides on top of the environment configuration.
    pub fn apply(&self, config: &mut ClientConfig) -> Result<()> {
        if let Some(url) = &self.url {
            config.ws_url = parse_ws_url(url).map_err(|e| anyhow!("Invalid --url '{}': {}", url, e))?;
        }
        if self.backoff {
            if let ReconnectPolicy::Fixed { delay } = config.reconnect {
                config.reconnect = reconnect_policy(true, delay, DEFAULT_MAX_RECONNECT_DELAY);
            }
        }
        Ok(())
    }
}

/// What a line typed by the athlete means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer(bool),
    Chat(String),
    Empty,
}

/// Interprets a line of input. Yes/no words only count as an answer while a
/// confirmation is pending.
pub fn parse_input(line: &str, confirmation_pending: bool) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Input::Empty;
    }
    if confirmation_pending {
        match trimmed.to_lowercase().as_str() {
            "y" | "yes" => return Input::Answer(true),
            "n" | "no" => return Input::Answer(false),
            _ => {}
        }
    }
    Input::Chat(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tracing::Level;

    fn base_config() -> ClientConfig {
        ClientConfig {
            ws_url: parse_ws_url("ws://localhost:8000/ws").unwrap(),
            reconnect: ReconnectPolicy::default(),
            log_level: Level::INFO,
        }
    }

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from(["train-r-console", "--url", "ws://10.0.0.2:9000/ws", "--backoff"]);
        assert_eq!(args.url.as_deref(), Some("ws://10.0.0.2:9000/ws"));
        assert!(args.backoff);
        assert!(!args.health);
    }

    #[test]
    fn test_apply_overrides() {
        let args = Args::parse_from(["train-r-console", "--url", "wss://coach.example.com/ws", "--backoff"]);
        let mut config = base_config();
        args.apply(&mut config).unwrap();

        assert_eq!(config.ws_url.as_str(), "wss://coach.example.com/ws");
        assert_eq!(
            config.reconnect,
            ReconnectPolicy::ExponentialBackoff {
                initial: Duration::from_millis(3000),
                max: Duration::from_secs(30),
            }
        );
    }

    #[test]
    fn test_apply_without_flags_keeps_config() {
        let args = Args::parse_from(["train-r-console"]);
        let mut config = base_config();
        args.apply(&mut config).unwrap();

        assert_eq!(config.ws_url.as_str(), "ws://localhost:8000/ws");
        assert_eq!(config.reconnect, ReconnectPolicy::default());
    }

    #[test]
    fn test_apply_rejects_bad_url() {
        let args = Args::parse_from(["train-r-console", "--url", "localhost:8000"]);
        let mut config = base_config();
        assert!(args.apply(&mut config).is_err());
    }

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("  ", true), Input::Empty);
        assert_eq!(parse_input("Yes", true), Input::Answer(true));
        assert_eq!(parse_input("n\n", true), Input::Answer(false));
        assert_eq!(parse_input("yes", false), Input::Chat("yes".into()));
        assert_eq!(
            parse_input(" build me a sweet spot workout ", true),
            Input::Chat("build me a sweet spot workout".into())
        );
    }
}
