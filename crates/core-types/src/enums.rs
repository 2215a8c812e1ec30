use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The side of a proposed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Long" => Ok(Direction::Long),
            "Short" => Ok(Direction::Short),
            other => Err(CoreError::InvalidInput(
                "direction".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// The candle interval an analysis runs on.
///
/// The user-facing spelling ("1H", "4H", ...) is what gets persisted and
/// displayed; each exchange has its own interval vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1H", alias = "1h")]
    H1,
    #[serde(rename = "4H", alias = "4h")]
    H4,
    #[serde(rename = "1D", alias = "1d")]
    D1,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1H",
            Timeframe::H4 => "4H",
            Timeframe::D1 => "1D",
        }
    }

    /// The interval string used by the Binance klines endpoint.
    pub fn binance_interval(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
        }
    }

    /// The interval string used by the Bybit v5 kline endpoint.
    pub fn bybit_interval(&self) -> &'static str {
        match self {
            Timeframe::M5 => "5",
            Timeframe::M15 => "15",
            Timeframe::H1 => "60",
            Timeframe::H4 => "240",
            Timeframe::D1 => "D",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "5m" => Ok(Timeframe::M5),
            "15m" => Ok(Timeframe::M15),
            "1H" | "1h" => Ok(Timeframe::H1),
            "4H" | "4h" => Ok(Timeframe::H4),
            "1D" | "1d" => Ok(Timeframe::D1),
            other => Err(CoreError::InvalidInput(
                "timeframe".to_string(),
                other.to_string(),
            )),
        }
    }
}

/// Lifecycle of a published signal.
///
/// Statuses only ever move forward: `Open` can jump to any later status,
/// `TP1 Hit` can still resolve to one of the terminal statuses, and the
/// terminal statuses never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalStatus {
    Open,
    #[serde(rename = "TP1 Hit")]
    Tp1Hit,
    #[serde(rename = "TP2 Hit")]
    Tp2Hit,
    #[serde(rename = "SL Hit")]
    SlHit,
    Closed,
    Invalidated,
}

impl SignalStatus {
    pub const ALL: [SignalStatus; 6] = [
        SignalStatus::Open,
        SignalStatus::Tp1Hit,
        SignalStatus::Tp2Hit,
        SignalStatus::SlHit,
        SignalStatus::Closed,
        SignalStatus::Invalidated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalStatus::Open => "Open",
            SignalStatus::Tp1Hit => "TP1 Hit",
            SignalStatus::Tp2Hit => "TP2 Hit",
            SignalStatus::SlHit => "SL Hit",
            SignalStatus::Closed => "Closed",
            SignalStatus::Invalidated => "Invalidated",
        }
    }

    /// Terminal statuses stamp a closure time when they are reached.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            SignalStatus::Tp2Hit
                | SignalStatus::SlHit
                | SignalStatus::Closed
                | SignalStatus::Invalidated
        )
    }

    /// Whether the signal counts as a win in performance figures.
    pub fn is_win(&self) -> bool {
        matches!(
            self,
            SignalStatus::Tp1Hit | SignalStatus::Tp2Hit | SignalStatus::Closed
        )
    }

    fn stage(&self) -> u8 {
        match self {
            SignalStatus::Open => 0,
            SignalStatus::Tp1Hit => 1,
            _ => 2,
        }
    }

    pub fn can_advance_to(&self, next: SignalStatus) -> bool {
        next.stage() > self.stage()
    }

    /// Validates a status update, returning the new status when it moves forward.
    pub fn advance_to(self, next: SignalStatus) -> Result<SignalStatus, CoreError> {
        if self.can_advance_to(next) {
            Ok(next)
        } else {
            Err(CoreError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidInput("status".to_string(), s.to_string()))
    }
}
