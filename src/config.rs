//! Runtime configuration
//!
//! Defaults come from `constants`. A handful of environment variables can
//! override them, and the binary applies its command line flags on top.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `XRP_TICKER_API_URL` | `https://api.coingecko.com/api/v3` |
//! | `XRP_TICKER_WINDOW_SECS` | `60` |
//! | `XRP_TICKER_TIMEOUT_SECS` | `10` |
//! | `XRP_TICKER_AUTO_UPDATE` | `true` |
//! | `XRP_TICKER_COUNTDOWN_POLICY` | `independent` |

use crate::{
    constants::{
        AUTO_UPDATE_WINDOW_SECS, COINGECKO_API_URL, COUNTDOWN_TICK_MS, REQUEST_TIMEOUT_SECS,
    },
    error::ConfigError,
    timer::CountdownPolicy,
};
use std::time::Duration;

pub const ENV_API_URL: &str = "XRP_TICKER_API_URL";
pub const ENV_WINDOW_SECS: &str = "XRP_TICKER_WINDOW_SECS";
pub const ENV_TIMEOUT_SECS: &str = "XRP_TICKER_TIMEOUT_SECS";
pub const ENV_AUTO_UPDATE: &str = "XRP_TICKER_AUTO_UPDATE";
pub const ENV_COUNTDOWN_POLICY: &str = "XRP_TICKER_COUNTDOWN_POLICY";

/// Settings for the fetcher and the auto-update timer
#[derive(Debug, Clone, PartialEq)]
pub struct TickerConfig {
    /// CoinGecko API base URL (without the `/coins/...` path)
    pub api_base_url: String,
    /// Seconds between automatic refreshes
    pub window_secs: u64,
    /// Countdown tick length
    pub tick: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Whether auto-update starts enabled
    pub auto_update: bool,
    /// How manual fetches interact with the countdown
    pub countdown_policy: CountdownPolicy,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            api_base_url: COINGECKO_API_URL.to_string(),
            window_secs: AUTO_UPDATE_WINDOW_SECS,
            tick: Duration::from_millis(COUNTDOWN_TICK_MS),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            auto_update: true,
            countdown_policy: CountdownPolicy::Independent,
        }
    }
}

impl TickerConfig {
    /// Reads overrides from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, starting from the defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL) {
            config.api_base_url = url;
        }
        if let Some(raw) = lookup(ENV_WINDOW_SECS) {
            config.window_secs = parse_secs(ENV_WINDOW_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = parse_secs(ENV_TIMEOUT_SECS, &raw)?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup(ENV_AUTO_UPDATE) {
            config.auto_update = parse_bool(ENV_AUTO_UPDATE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_COUNTDOWN_POLICY) {
            config.countdown_policy = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the timer or the HTTP client cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_secs == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                ENV_API_URL,
                self.api_base_url.clone(),
            ));
        }
        Ok(())
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid_value(key, raw))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, raw)),
    }
}
