use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::price::PricePoint;

/// Trait abstraction for stock history sources.
///
/// The dashboard flow prefers a local CSV sample when one exists and falls
/// back to the remote prediction API otherwise; putting the lookup behind a
/// trait keeps that preference order testable and lets new sources (bundled
/// fixtures, another download format) slot in without touching the flow.
#[async_trait]
pub trait StockDataSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Whether this source can serve the given ticker (case-insensitive).
    fn has_data(&self, ticker: &str) -> bool;

    /// Tickers this source can serve, sorted.
    fn available_tickers(&self) -> Vec<String>;

    /// Load the full daily history for a ticker, oldest row first.
    async fn fetch(&self, ticker: &str) -> Result<Vec<PricePoint>, CoreError>;
}
