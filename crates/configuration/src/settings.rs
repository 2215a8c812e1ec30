use crate::error::ConfigError;
use core_types::{MIN_CANDLES, Timeframe};
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub signals: SignalSettings,
    pub watchlist: Vec<WatchlistEntry>,
    pub market_data: MarketDataConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

/// Parameters for batch signal generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SignalSettings {
    /// Appended to every signal and every on-demand response.
    pub disclaimer: String,
    /// Cron expression handed to whichever scheduler triggers `generate`.
    pub schedule: String,
    /// How many candles to request per analysis.
    pub candle_count: usize,
}

/// One asset the batch generator looks at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub timeframe: Timeframe,
}

/// Endpoints and timeouts for the market-data providers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub binance_base_url: String,
    pub bybit_base_url: String,
    pub candle_timeout_ms: u64,
    pub ticker_timeout_ms: u64,
}

/// Timeframes used by the on-demand overview.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// The bias of the overview comes from this timeframe.
    pub primary_timeframe: Timeframe,
    /// Detail lines and levels come from this timeframe.
    pub confirmation_timeframe: Timeframe,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

// --- Default Implementations ---

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            disclaimer: "This analysis is for informational purposes only. Trade responsibly. \
                         Market conditions change rapidly."
                .to_string(),
            schedule: "0 8 * * *".to_string(),
            candle_count: 300,
        }
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            binance_base_url: "https://api.binance.com/api/v3".to_string(),
            bybit_base_url: "https://api.bybit.com/v5/market".to_string(),
            candle_timeout_ms: 8_000,
            ticker_timeout_ms: 5_000,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            primary_timeframe: Timeframe::H4,
            confirmation_timeframe: Timeframe::H1,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

impl WatchlistEntry {
    pub fn new(symbol: &str, timeframe: Timeframe) -> Self {
        Self {
            symbol: symbol.to_string(),
            timeframe,
        }
    }
}

/// The watchlist used when neither the file nor the environment provides one.
pub fn default_watchlist() -> Vec<WatchlistEntry> {
    vec![
        WatchlistEntry::new("BTCUSDT", Timeframe::H1),
        WatchlistEntry::new("ETHUSDT", Timeframe::H1),
        WatchlistEntry::new("SOLUSDT", Timeframe::H4),
        WatchlistEntry::new("BNBUSDT", Timeframe::H4),
    ]
}

impl Config {
    /// Checks the cross-field rules serde cannot express.
    ///
    /// An absent watchlist falls back to the default one; an explicitly empty
    /// symbol is rejected.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signals.candle_count < MIN_CANDLES {
            return Err(ConfigError::ValidationError(format!(
                "signals.candle_count must be at least {MIN_CANDLES}, got {}",
                self.signals.candle_count
            )));
        }

        let fields = self.signals.schedule.split_whitespace().count();
        if fields != 5 {
            return Err(ConfigError::ValidationError(format!(
                "signals.schedule must be a 5-field cron expression, got '{}'",
                self.signals.schedule
            )));
        }

        if let Some(entry) = self.watchlist.iter().find(|e| e.symbol.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "watchlist entry with timeframe {} has an empty symbol",
                entry.timeframe
            )));
        }

        Ok(())
    }

    /// The configured watchlist, or the default one when none is configured.
    pub fn effective_watchlist(&self) -> Vec<WatchlistEntry> {
        if self.watchlist.is_empty() {
            default_watchlist()
        } else {
            self.watchlist.clone()
        }
    }
}
