use crate::enums::{Direction, SignalStatus, Timeframe};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single OHLCV bar. Sequences are always ordered oldest to newest.
///
/// Prices are kept as `f64` because the analysis kernels operate on floats;
/// anything that leaves the analysis engine is rounded into a `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// A 24h ticker snapshot for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: String,
    pub price: Decimal,
    /// 24h price change in percent.
    pub change_24h: Decimal,
    /// 24h traded volume in the quote asset.
    pub volume_24h: Decimal,
}

/// The price band a signal should be entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryZone {
    pub low: Decimal,
    pub mid: Decimal,
    pub high: Decimal,
}

/// A trade idea derived from an analysis report.
///
/// Levels, reasoning and disclaimer are fixed when the signal is built. Only
/// `status` is allowed to change afterwards, and that is owned by persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub signal_id: Uuid,
    pub asset: String,
    pub direction: Direction,
    pub entry: EntryZone,
    pub stop_loss: Decimal,
    pub targets: [Decimal; 2],
    pub timeframe: Timeframe,
    /// Formatted as `1:<ratio>`, or `"0"` when the stop sits on the entry.
    pub risk_reward: String,
    pub reasoning: String,
    pub status: SignalStatus,
    pub disclaimer: String,
    pub created_at: DateTime<Utc>,
}

/// A signal as it is stored, with the fields that change after publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    pub id: Uuid,
    pub asset: String,
    pub direction: Direction,
    pub entry_low: Decimal,
    pub entry_high: Decimal,
    pub stop_loss: Decimal,
    pub target_1: Decimal,
    pub target_2: Decimal,
    pub timeframe: Timeframe,
    pub rr_ratio: String,
    pub status: SignalStatus,
    pub reasoning: String,
    pub disclaimer: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Realized move in percent, filled in once the outcome is known.
    pub result_pct: Option<Decimal>,
}

impl From<&Signal> for SignalRecord {
    fn from(signal: &Signal) -> Self {
        Self {
            id: signal.signal_id,
            asset: signal.asset.clone(),
            direction: signal.direction,
            entry_low: signal.entry.low,
            entry_high: signal.entry.high,
            stop_loss: signal.stop_loss,
            target_1: signal.targets[0],
            target_2: signal.targets[1],
            timeframe: signal.timeframe,
            rr_ratio: signal.risk_reward.clone(),
            status: signal.status,
            reasoning: signal.reasoning.clone(),
            disclaimer: signal.disclaimer.clone(),
            created_at: signal.created_at,
            closed_at: None,
            result_pct: None,
        }
    }
}
