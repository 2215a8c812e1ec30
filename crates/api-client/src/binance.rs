use crate::error::ApiError;
use crate::responses::{BinanceErrorResponse, RawKline, TickerResponse, candle_from_parts, parse_time};
use crate::MarketData;
use async_trait::async_trait;
use configuration::MarketDataConfig;
use core_types::{Candle, Ticker, Timeframe};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::time::Duration;

/// Public market data from the Binance spot REST API.
#[derive(Debug, Clone)]
pub struct BinanceClient {
    client: reqwest::Client,
    base_url: String,
    candle_timeout: Duration,
    ticker_timeout: Duration,
}

impl BinanceClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: config.binance_base_url.trim_end_matches('/').to_string(),
            candle_timeout: Duration::from_millis(config.candle_timeout_ms),
            ticker_timeout: Duration::from_millis(config.ticker_timeout_ms),
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .timeout(timeout)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| ApiError::Deserialization(e.to_string()))
        } else {
            match serde_json::from_str::<BinanceErrorResponse>(&text) {
                Ok(err) => Err(ApiError::ApiError(format!(
                    "Binance error {}: {}",
                    err.code, err.msg
                ))),
                Err(_) => Err(ApiError::ApiError(format!("Binance HTTP {status}: {text}"))),
            }
        }
    }
}

#[async_trait]
impl MarketData for BinanceClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        let rows: Vec<RawKline> = self
            .get(
                "/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", timeframe.binance_interval().to_string()),
                    ("limit", limit.to_string()),
                ],
                self.candle_timeout,
            )
            .await?;

        rows.into_iter()
            .map(|raw| candle_from_parts(parse_time(raw.0)?, &raw.1, &raw.2, &raw.3, &raw.4, &raw.5))
            .collect()
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ApiError> {
        let raw: TickerResponse = self
            .get(
                "/ticker/24hr",
                &[("symbol", symbol.to_string())],
                self.ticker_timeout,
            )
            .await?;

        let decimal = |field: &str, value: &str| {
            Decimal::from_str(value)
                .map(|d| d.normalize())
                .map_err(|e| ApiError::Deserialization(format!("{field} '{value}': {e}")))
        };

        Ok(Ticker {
            symbol: raw.symbol,
            price: decimal("lastPrice", &raw.last_price)?,
            change_24h: decimal("priceChangePercent", &raw.price_change_percent)?,
            volume_24h: decimal("quoteVolume", &raw.quote_volume)?,
        })
    }
}
