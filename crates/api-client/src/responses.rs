use crate::error::ApiError;
use chrono::{DateTime, TimeZone, Utc};
use core_types::Candle;
use serde::Deserialize;

/// One row of `GET /klines`. Prices arrive as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct RawKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub String,
    pub i64,
    pub String,
    pub String,
    pub String,
);

/// The response from `GET /ticker/24hr`.
// Using `#[serde(rename_all = "camelCase")]` to automatically map from JSON camelCase to Rust snake_case.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TickerResponse {
    pub symbol: String,
    pub last_price: String,
    pub price_change_percent: String,
    pub quote_volume: String,
}

/// Represents an error response from the Binance API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BinanceErrorResponse {
    pub code: i64,
    pub msg: String,
}

/// Envelope of every Bybit v5 market response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BybitResponse<T> {
    pub ret_code: i64,
    pub ret_msg: String,
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BybitKlineResult {
    /// Newest first: `[startTime, open, high, low, close, volume, turnover]`.
    #[serde(default)]
    pub list: Vec<Vec<String>>,
}

pub(crate) fn parse_f64(field: &str, raw: &str) -> Result<f64, ApiError> {
    raw.parse::<f64>()
        .map_err(|e| ApiError::Deserialization(format!("{field} '{raw}': {e}")))
}

pub(crate) fn parse_time(millis: i64) -> Result<DateTime<Utc>, ApiError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ApiError::InvalidData(format!("Invalid open_time: {millis}")))
}

/// Builds a candle from `[time, open, high, low, close, volume]` fields.
pub(crate) fn candle_from_parts(
    time: DateTime<Utc>,
    open: &str,
    high: &str,
    low: &str,
    close: &str,
    volume: &str,
) -> Result<Candle, ApiError> {
    Ok(Candle {
        time,
        open: parse_f64("open", open)?,
        high: parse_f64("high", high)?,
        low: parse_f64("low", low)?,
        close: parse_f64("close", close)?,
        volume: parse_f64("volume", volume)?,
    })
}
