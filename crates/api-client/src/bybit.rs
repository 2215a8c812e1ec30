use crate::error::ApiError;
use crate::responses::{BybitKlineResult, BybitResponse, candle_from_parts, parse_time};
use configuration::MarketDataConfig;
use core_types::{Candle, Timeframe};
use std::time::Duration;

/// Candles from Bybit's linear-perpetual market, used when Binance is unavailable.
#[derive(Debug, Clone)]
pub struct BybitClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl BybitClient {
    pub fn new(config: &MarketDataConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            base_url: config.bybit_base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.candle_timeout_ms),
        })
    }

    /// Fetches up to `limit` candles, returned oldest first like every other source.
    pub async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        let url = format!("{}/kline", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", "linear".to_string()),
                ("symbol", symbol.to_string()),
                ("interval", timeframe.bybit_interval().to_string()),
                ("limit", limit.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::ApiError(format!("Bybit HTTP {status}: {text}")));
        }

        let body: BybitResponse<BybitKlineResult> =
            serde_json::from_str(&text).map_err(|e| ApiError::Deserialization(e.to_string()))?;
        if body.ret_code != 0 {
            return Err(ApiError::ApiError(format!("Bybit error: {}", body.ret_msg)));
        }
        let result = body
            .result
            .ok_or_else(|| ApiError::InvalidData("Bybit response has no result".to_string()))?;

        result
            .list
            .iter()
            .rev()
            .map(|row| {
                let [time, open, high, low, close, volume, ..] = row.as_slice() else {
                    return Err(ApiError::InvalidData(format!(
                        "Bybit kline row has {} fields",
                        row.len()
                    )));
                };
                let millis = time.parse::<i64>().map_err(|e| {
                    ApiError::Deserialization(format!("startTime '{time}': {e}"))
                })?;
                candle_from_parts(parse_time(millis)?, open, high, low, close, volume)
            })
            .collect()
    }
}
