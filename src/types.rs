//! Types for the XRP ticker

use serde::{Deserialize, Serialize};

/// Normalized XRP market summary
///
/// Built fresh from every successful fetch and never modified afterwards;
/// the next successful fetch replaces it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Spot price in USD
    pub price_usd: f64,

    /// 24h price change percentage (signed)
    pub price_change_percent_24h: f64,

    /// Market capitalisation in USD
    pub market_cap_usd: i64,

    /// 24h traded volume in USD
    pub volume_24h_usd: i64,

    /// 24h high in USD
    pub high_24h_usd: f64,

    /// 24h low in USD. Expected to be `<= high_24h_usd`, not enforced.
    pub low_24h_usd: f64,
}

/// Where a fetch request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrigin {
    /// First load when the screen starts
    Initial,
    /// Refresh or retry action from the user
    Manual,
    /// Auto-update countdown reached zero
    Timer,
}

impl FetchOrigin {
    /// Returns true for user-initiated and initial fetches
    pub fn is_manual(&self) -> bool {
        !matches!(self, FetchOrigin::Timer)
    }
}

impl std::fmt::Display for FetchOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FetchOrigin::Initial => "initial",
            FetchOrigin::Manual => "manual",
            FetchOrigin::Timer => "timer",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_initial_and_manual_count_as_manual() {
        assert!(FetchOrigin::Initial.is_manual());
        assert!(FetchOrigin::Manual.is_manual());
        assert!(!FetchOrigin::Timer.is_manual());
        assert_eq!(FetchOrigin::Timer.to_string(), "timer");
    }

    #[test]
    fn serializes_with_snake_case_fields() {
        let summary = PriceSummary {
            price_usd: 2.5,
            price_change_percent_24h: -1.0,
            market_cap_usd: 140_000_000_000,
            volume_24h_usd: 3_000_000_000,
            high_24h_usd: 2.6,
            low_24h_usd: 2.4,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["market_cap_usd"], 140_000_000_000i64);
        assert_eq!(json["price_change_percent_24h"], -1.0);
        assert_eq!(serde_json::to_value(FetchOrigin::Timer).unwrap(), "timer");
    }
}
