//! # XRP Ticker
//!
//! Live XRP market summary (price, 24h change, range, market cap, volume)
//! from CoinGecko, with an optional auto-update countdown.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use xrp_ticker::{CoinGeckoProvider, LocalClock, PriceScreen, TickerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TickerConfig::from_env()?;
//! let provider = Arc::new(CoinGeckoProvider::from_config(&config)?);
//! let mut screen = PriceScreen::new(provider, Arc::new(LocalClock), &config);
//!
//! screen.start();
//! screen.step().await;
//! println!("{}", xrp_ticker::view::render(screen.state()));
//!
//! // stops the timer and shuts the provider down
//! screen.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! AutoRefreshTimer (1s ticks, fires every window)
//!     ↓
//! PriceScreen ←── refresh() / set_auto_update()
//!     ↓
//! SummaryProvider (CoinGecko)
//!     ↓
//! ScreenState → view / format → your display
//! ```

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod metrics;
pub mod provider;
pub mod providers;
pub mod screen;
pub mod timer;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use clock::{Clock, LocalClock};
pub use config::TickerConfig;
pub use error::{ConfigError, FetchError};
pub use metrics::ProviderMetrics;
pub use provider::SummaryProvider;
pub use providers::CoinGeckoProvider;
pub use screen::{Phase, PriceScreen, ScreenChange, ScreenState};
pub use timer::{AutoRefreshTimer, CountdownPolicy};
pub use types::{FetchOrigin, PriceSummary};
