use crate::binance::BinanceClient;
use crate::bybit::BybitClient;
use crate::error::ApiError;
use crate::MarketData;
use async_trait::async_trait;
use configuration::MarketDataConfig;
use core_types::{Candle, Ticker, Timeframe};

/// Binance first, Bybit for candles when Binance fails.
///
/// Tickers have no second source; a failed ticker fetch is returned as is.
#[derive(Debug, Clone)]
pub struct FallbackMarketData {
    primary: BinanceClient,
    fallback: BybitClient,
}

impl FallbackMarketData {
    pub fn new(config: &MarketDataConfig) -> Result<Self, ApiError> {
        Ok(Self {
            primary: BinanceClient::new(config)?,
            fallback: BybitClient::new(config)?,
        })
    }
}

#[async_trait]
impl MarketData for FallbackMarketData {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        match self.primary.fetch_candles(symbol, timeframe, limit).await {
            Ok(candles) => Ok(candles),
            Err(e) => {
                tracing::warn!(symbol, %timeframe, error = %e, "Binance candles failed, trying Bybit");
                self.fallback.fetch_candles(symbol, timeframe, limit).await
            }
        }
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ApiError> {
        self.primary
            .fetch_ticker(symbol)
            .await
            .inspect_err(|e| tracing::error!(symbol, error = %e, "Ticker fetch failed"))
    }
}
