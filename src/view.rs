//! Display strings for a summary
//!
//! Turns a `PriceSummary` into the text the price card shows. Layout and
//! colours are the caller's business; `Trend` says which way to colour.

use crate::{
    format::{format_abbreviated, format_percent, format_usd, trend_glyphs, Trend},
    screen::{Phase, ScreenState},
    types::PriceSummary,
};
use std::fmt;

/// Decimals for the headline price
const PRICE_DECIMALS: u32 = 2;

/// Decimals for the 24h high/low
const RANGE_DECIMALS: u32 = 3;

/// Formatted fields of one summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub price: String,
    pub change: String,
    pub trend: Trend,
    /// Zero or more ▲/▼, one per 5 points of change
    pub emphasis: String,
    pub high: String,
    pub low: String,
    pub market_cap: String,
    pub volume: String,
}

impl SummaryView {
    pub fn new(summary: &PriceSummary) -> Self {
        let change = summary.price_change_percent_24h;
        Self {
            price: format_usd(summary.price_usd, PRICE_DECIMALS),
            change: format_percent(change),
            trend: Trend::from_change(change),
            emphasis: trend_glyphs(change),
            high: format_usd(summary.high_24h_usd, RANGE_DECIMALS),
            low: format_usd(summary.low_24h_usd, RANGE_DECIMALS),
            market_cap: format_abbreviated(summary.market_cap_usd),
            volume: format_abbreviated(summary.volume_24h_usd),
        }
    }
}

impl fmt::Display for SummaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "XRP {}  {} {}", self.price, self.change, self.emphasis)?;
        writeln!(f, "  24h high {}  low {}", self.high, self.low)?;
        write!(f, "  Market cap {}  24h volume {}", self.market_cap, self.volume)
    }
}

/// Footer text: last update time and the auto-update countdown
pub fn status_line(state: &ScreenState) -> String {
    let updated = state.last_updated.as_deref().unwrap_or("never");
    if state.auto_update_enabled {
        format!(
            "Last updated {updated} · auto-update in {}s",
            state.seconds_until_update
        )
    } else {
        format!("Last updated {updated} · auto-update off")
    }
}

/// Full card text for the current phase
pub fn render(state: &ScreenState) -> String {
    match state.phase() {
        Phase::Empty => "No data yet".to_string(),
        Phase::Loading => "Loading XRP market data...".to_string(),
        Phase::Failed(message) => format!("Error loading data: {message}\n  (r to try again)"),
        Phase::Ready(summary) => {
            format!("{}\n  {}", SummaryView::new(summary), status_line(state))
        }
    }
}
