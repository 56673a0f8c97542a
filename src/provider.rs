//! Provider abstraction for fetching the XRP market summary

use crate::{error::FetchError, types::PriceSummary};
use async_trait::async_trait;

/// Trait for market summary providers
///
/// Implementations perform exactly one upstream request per call and never
/// retry on their own; retrying is up to the caller (a manual refresh or the
/// next auto-update cycle).
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Fetches a fresh market summary
    ///
    /// # Returns
    /// The normalized summary, or a `FetchError` describing why the request
    /// or its decoding failed
    async fn fetch_summary(&self) -> Result<PriceSummary, FetchError>;

    /// Releases pooled connections
    ///
    /// Call once when the provider is no longer needed. Fetches issued after
    /// shutdown fail with `FetchError::Closed`.
    async fn shutdown(&self);

    /// Returns the name of this provider
    fn provider_name(&self) -> &'static str;
}
