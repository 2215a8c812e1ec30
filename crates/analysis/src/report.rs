use core_types::{Direction, Timeframe};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The engine's single output for one (candles, timeframe) input.
///
/// Every numeric field is already rounded to 2 decimals. A report is never
/// mutated after `analyze` returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub timeframe: Timeframe,
    pub current_price: Decimal,
    pub indicators: IndicatorSet,
    pub structure: StructureSet,
    pub bias: Bias,
    pub summary: Vec<String>,
}

// I. Indicators

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ema: EmaSet,
    pub rsi: RsiReading,
    pub macd: MacdReading,
    pub volume: VolumeReading,
}

/// Latest values of the four exponential moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmaSet {
    pub ema9: Decimal,
    pub ema21: Decimal,
    pub ema50: Decimal,
    pub ema200: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: Decimal,
    pub signal: RsiSignal,
}

/// State of the MACD histogram relative to the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdCrossover {
    BullishCrossover,
    BearishCrossover,
    Bullish,
    Bearish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacdReading {
    pub macd: Decimal,
    pub signal: Decimal,
    pub histogram: Decimal,
    pub crossover: MacdCrossover,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeSignal {
    High,
    Low,
    Average,
}

/// Latest volume against the trailing 20-bar mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeReading {
    pub current: Decimal,
    pub avg20: Decimal,
    pub ratio: Decimal,
    pub signal: VolumeSignal,
}

// II. Structure

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSet {
    pub trend: Trend,
    pub support_resistance: SupportResistance,
}

/// Coarse swing-structure label from comparing two 10-bar halves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Higher high and higher low.
    Uptrend,
    /// Lower high and lower low.
    Downtrend,
    /// Higher high and lower low.
    Expanding,
    Ranging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub kind: LevelKind,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportResistance {
    /// Highest support strictly below the current price.
    pub nearest_support: Option<Decimal>,
    /// Lowest resistance strictly above the current price.
    pub nearest_resistance: Option<Decimal>,
    /// Detected pivots in scan order, at most ten.
    pub levels: Vec<Level>,
}

// III. Verdict

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
    #[serde(rename = "Neutral / Wait")]
    Neutral,
}

impl Bias {
    /// The trade side this bias calls for, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            Bias::Bullish => Some(Direction::Long),
            Bias::Bearish => Some(Direction::Short),
            Bias::Neutral => None,
        }
    }
}

// --- Display labels used in summaries and CLI output ---

impl fmt::Display for RsiSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RsiSignal::Overbought => "overbought",
            RsiSignal::Oversold => "oversold",
            RsiSignal::Neutral => "neutral",
        })
    }
}

impl fmt::Display for MacdCrossover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MacdCrossover::BullishCrossover => "bullish crossover",
            MacdCrossover::BearishCrossover => "bearish crossover",
            MacdCrossover::Bullish => "bullish",
            MacdCrossover::Bearish => "bearish",
        })
    }
}

impl fmt::Display for VolumeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VolumeSignal::High => "high, strong conviction",
            VolumeSignal::Low => "low, weak conviction",
            VolumeSignal::Average => "average",
        })
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Trend::Uptrend => "uptrend (HH + HL)",
            Trend::Downtrend => "downtrend (LH + LL)",
            Trend::Expanding => "volatile / expanding",
            Trend::Ranging => "ranging / consolidation",
        })
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LevelKind::Support => "support",
            LevelKind::Resistance => "resistance",
        })
    }
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Bias::Bullish => "Bullish",
            Bias::Bearish => "Bearish",
            Bias::Neutral => "Neutral / Wait",
        })
    }
}
