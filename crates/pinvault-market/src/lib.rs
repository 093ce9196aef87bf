//! Marketplace integration: OAuth token cache, listing search and the price
//! signals derived from sold listings.

pub mod aggregate;
pub mod classify;
pub mod client;
pub mod error;
pub mod token;

use async_trait::async_trait;
use pinvault_types::market::ItemSummary;

pub use aggregate::PriceAggregator;
pub use client::{MarketConfig, MarketEnv, MarketplaceClient};
pub use error::MarketError;

/// Listing searches that fail open: any upstream failure is logged and
/// yields an empty list, which callers read as "temporarily unavailable".
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// Sold listings matching `query`. `filters` are extra vendor query parameters.
    async fn search(&self, query: &str, limit: u32, filters: &[(&str, &str)]) -> Vec<ItemSummary>;

    /// Active listings matching `terms`.
    async fn browse(&self, terms: &str, limit: u32) -> Vec<ItemSummary>;
}
