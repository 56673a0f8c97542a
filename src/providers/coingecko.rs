//! CoinGecko summary provider implementation

use crate::{
    config::TickerConfig,
    constants::{
        COINGECKO_API_URL, COINGECKO_COIN_ID, COINGECKO_COIN_QUERY, QUOTE_CURRENCY,
        REQUEST_TIMEOUT_SECS, USER_AGENT,
    },
    error::FetchError,
    provider::SummaryProvider,
    types::PriceSummary,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;

/// How much of an error body is kept in `FetchError::Status`
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Currency code to value, e.g. `{"usd": 0.52, "eur": 0.48}`
type CurrencyMap = HashMap<String, Option<f64>>;

/// CoinGecko `/coins/{id}` response; only `market_data` is read
#[derive(Debug, Deserialize)]
struct CoinResponse {
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    current_price: Option<CurrencyMap>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<CurrencyMap>,
    total_volume: Option<CurrencyMap>,
    high_24h: Option<CurrencyMap>,
    low_24h: Option<CurrencyMap>,
}

/// USD entry of a currency map, `0.0` when missing or null
fn usd(map: &Option<CurrencyMap>) -> f64 {
    map.as_ref()
        .and_then(|m| m.get(QUOTE_CURRENCY).copied().flatten())
        .unwrap_or(0.0)
}

/// Parses a `/coins/{id}` body into a summary
///
/// Missing USD figures become zero so that partial upstream data still
/// renders. A body without `market_data` is rejected.
pub fn parse_summary(body: &str) -> Result<PriceSummary, FetchError> {
    let response: CoinResponse = serde_json::from_str(body).map_err(|e| {
        FetchError::decode(format!(
            "Failed to parse CoinGecko response: {}. Response: {}",
            e,
            truncate(body)
        ))
    })?;
    let data = response.market_data;

    Ok(PriceSummary {
        price_usd: usd(&data.current_price),
        price_change_percent_24h: data.price_change_percentage_24h.unwrap_or(0.0),
        // upstream sends these as integers or floats depending on the coin
        market_cap_usd: usd(&data.market_cap).round() as i64,
        volume_24h_usd: usd(&data.total_volume).round() as i64,
        high_24h_usd: usd(&data.high_24h),
        low_24h_usd: usd(&data.low_24h),
    })
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// CoinGecko summary provider
///
/// Holds a single pooled `reqwest::Client` until `shutdown` drops it.
pub struct CoinGeckoProvider {
    client: RwLock<Option<Client>>,
    coin_url: String,
}

impl CoinGeckoProvider {
    /// Creates a provider against the public CoinGecko API
    pub fn new() -> Result<Self, FetchError> {
        Self::with_options(
            COINGECKO_API_URL,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        )
    }

    /// Creates a provider from the ticker configuration
    pub fn from_config(config: &TickerConfig) -> Result<Self, FetchError> {
        Self::with_options(&config.api_base_url, config.request_timeout)
    }

    /// Creates a provider against `base_url` with a request timeout
    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Network)?;

        Ok(Self {
            client: RwLock::new(Some(client)),
            coin_url: Self::build_url(base_url),
        })
    }

    /// Builds the coin endpoint URL (query parameters are added per request)
    fn build_url(base_url: &str) -> String {
        format!(
            "{}/coins/{}",
            base_url.trim_end_matches('/'),
            COINGECKO_COIN_ID
        )
    }

    /// Returns true once `shutdown` has run
    pub async fn is_closed(&self) -> bool {
        self.client.read().await.is_none()
    }
}

#[async_trait]
impl SummaryProvider for CoinGeckoProvider {
    async fn fetch_summary(&self) -> Result<PriceSummary, FetchError> {
        // reqwest clients are Arc handles; cloning keeps the lock short
        let client = self
            .client
            .read()
            .await
            .clone()
            .ok_or(FetchError::Closed)?;

        tracing::debug!(url = %self.coin_url, "Fetching XRP summary from CoinGecko");

        let response = client
            .get(&self.coin_url)
            .query(COINGECKO_COIN_QUERY)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::status(status, truncate(&body)));
        }

        let body = response.text().await?;
        let summary = parse_summary(&body)?;

        tracing::debug!(
            price_usd = summary.price_usd,
            change_24h = summary.price_change_percent_24h,
            "Successfully fetched XRP summary from CoinGecko"
        );

        Ok(summary)
    }

    async fn shutdown(&self) {
        match self.client.write().await.take() {
            Some(_client) => tracing::debug!("CoinGecko client released"),
            None => tracing::warn!("CoinGecko provider was already shut down"),
        }
    }

    fn provider_name(&self) -> &'static str {
        "coingecko"
    }
}
