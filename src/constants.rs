//! Constants for the XRP ticker
//!
//! Defaults live here as compile-time constants. `config::TickerConfig`
//! starts from these values and lets the environment or the command line
//! override a few of them.

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko coin id for XRP
pub const COINGECKO_COIN_ID: &str = "ripple";

/// Query parameters for the coin endpoint: market data only
pub const COINGECKO_COIN_QUERY: &[(&str, &str)] = &[
    ("localization", "false"),
    ("tickers", "false"),
    ("market_data", "true"),
    ("community_data", "false"),
    ("developer_data", "false"),
    ("sparkline", "false"),
];

/// Currency key used inside the `market_data` maps
pub const QUOTE_CURRENCY: &str = "usd";

/// Seconds between automatic refreshes while auto-update is on
pub const AUTO_UPDATE_WINDOW_SECS: u64 = 60;

/// Countdown tick (in milliseconds)
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// HTTP request timeout when fetching the summary (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Percentage points of 24h change per emphasis glyph
pub const TREND_STEP_PERCENT: f64 = 5.0;

/// `strftime` pattern for the "last updated" label
pub const CLOCK_FORMAT: &str = "%H:%M:%S";

/// User agent for HTTP requests
pub const USER_AGENT: &str = concat!("xrp-ticker/", env!("CARGO_PKG_VERSION"));
