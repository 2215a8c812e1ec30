//! Market-data collaborators: candle and ticker retrieval from exchange REST APIs.

use async_trait::async_trait;
use core_types::{Candle, Ticker, Timeframe};

pub mod binance;
pub mod bybit;
pub mod error;
pub mod fallback;
mod responses;

// --- Public API ---
pub use binance::BinanceClient;
pub use bybit::BybitClient;
pub use error::ApiError;
pub use fallback::FallbackMarketData;

/// The abstract interface for a market-data source.
/// Callers depend on this trait so that the live providers can be swapped
/// for in-memory data in tests.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetches up to `limit` candles, ordered oldest to newest.
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError>;

    /// Fetches the 24h ticker for `symbol`.
    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ApiError>;
}
