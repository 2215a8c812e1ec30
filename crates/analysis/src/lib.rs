//! # Clon Analysis Engine
//!
//! This crate turns an ordered candle sequence into an `AnalysisReport`: the
//! current state of the trend indicators, swing structure, a directional bias
//! and a set of human-readable summary lines.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of exchanges,
//!   databases or schedules. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `analyze` keeps nothing between calls. The same
//!   candles always produce the same report, so callers may run it concurrently
//!   for as many assets as they like.
//! - **Rounding at the Edge:** Kernels work in `f64`. Values are rounded to two
//!   decimals once, when they are written into the report, and the bias is
//!   classified from those report values.
//!
//! ## Public API
//!
//! - `analyze`: The single entry point.
//! - `AnalysisReport` and its parts (`IndicatorSet`, `StructureSet`, `Bias`, ...).
//! - `AnalysisError`: The error types that can be returned from this crate.
//! - The `Ema`, `Rsi` and `Macd` kernels, usable on their own through `ta`'s traits.

pub mod bias;
pub mod error;
pub mod indicators;
pub mod report;
pub mod rounding;
pub mod structure;
pub mod summary;

pub use bias::{BiasVotes, classify_bias, tally_votes};
pub use error::AnalysisError;
pub use indicators::{Ema, Macd, MacdOutput, Rsi};
pub use report::{
    AnalysisReport, Bias, EmaSet, IndicatorSet, Level, LevelKind, MacdCrossover, MacdReading,
    RsiReading, RsiSignal, StructureSet, SupportResistance, Trend, VolumeReading, VolumeSignal,
};
pub use rounding::round_dp2;

pub use core_types::MIN_CANDLES;

use core_types::{Candle, Timeframe};
use tracing::instrument;

/// Runs the full analysis over `candles` (oldest first).
///
/// # Errors
///
/// Returns `AnalysisError::InsufficientData` for fewer than [`MIN_CANDLES`]
/// candles and `AnalysisError::Calculation` if any value comes out non-finite.
#[instrument(level = "debug", skip(candles), fields(count = candles.len()))]
pub fn analyze(candles: &[Candle], timeframe: Timeframe) -> Result<AnalysisReport, AnalysisError> {
    if candles.len() < MIN_CANDLES {
        return Err(AnalysisError::InsufficientData {
            required: MIN_CANDLES,
            provided: candles.len(),
        });
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

    let last_close = *closes.last().ok_or(AnalysisError::InsufficientData {
        required: MIN_CANDLES,
        provided: 0,
    })?;
    let current_price = rounding::round_f64(last_close, "current price")?;

    let indicators = indicators::compute_indicators(&closes, &volumes)?;
    let structure = StructureSet {
        trend: structure::detect_trend(candles),
        support_resistance: structure::detect_support_resistance(candles, current_price)?,
    };

    let votes = bias::tally_votes(current_price, &indicators, structure.trend);
    let bias = bias::classify_bias(votes);
    tracing::debug!(?votes, %bias, "Bias classified");

    let summary = summary::build_summary(current_price, &indicators, &structure, bias);

    Ok(AnalysisReport {
        timeframe,
        current_price,
        indicators,
        structure,
        bias,
        summary,
    })
}
