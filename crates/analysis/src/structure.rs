//! Swing structure: pivot support/resistance and the two-halves trend label.

use crate::error::AnalysisError;
use crate::report::{Level, LevelKind, SupportResistance, Trend};
use crate::rounding::round_f64;
use core_types::Candle;
use rust_decimal::Decimal;

/// Bars scanned for pivots.
pub const SR_LOOKBACK: usize = 50;
/// A pivot must beat this many neighbours on each side.
pub const PIVOT_RADIUS: usize = 2;
pub const MAX_LEVELS: usize = 10;
/// Bars compared by the trend detector, split into two equal halves.
pub const TREND_WINDOW: usize = 20;

fn is_pivot_high(window: &[Candle], i: usize) -> bool {
    let high = window[i].high;
    (1..=PIVOT_RADIUS).all(|d| high > window[i - d].high && high > window[i + d].high)
}

fn is_pivot_low(window: &[Candle], i: usize) -> bool {
    let low = window[i].low;
    (1..=PIVOT_RADIUS).all(|d| low < window[i - d].low && low < window[i + d].low)
}

/// Finds fractal pivots in the trailing [`SR_LOOKBACK`] bars and picks the
/// levels closest to `current_price` on either side.
///
/// Nearest levels are chosen from every pivot found; only the published
/// `levels` list is capped at [`MAX_LEVELS`].
pub fn detect_support_resistance(
    candles: &[Candle],
    current_price: Decimal,
) -> Result<SupportResistance, AnalysisError> {
    let window = &candles[candles.len().saturating_sub(SR_LOOKBACK)..];

    let mut levels = Vec::new();
    if window.len() > 2 * PIVOT_RADIUS {
        for i in PIVOT_RADIUS..window.len() - PIVOT_RADIUS {
            if is_pivot_high(window, i) {
                levels.push(Level {
                    kind: LevelKind::Resistance,
                    price: round_f64(window[i].high, "resistance level")?,
                });
            }
            if is_pivot_low(window, i) {
                levels.push(Level {
                    kind: LevelKind::Support,
                    price: round_f64(window[i].low, "support level")?,
                });
            }
        }
    }

    let nearest_support = levels
        .iter()
        .filter(|l| l.kind == LevelKind::Support && l.price < current_price)
        .map(|l| l.price)
        .max();
    let nearest_resistance = levels
        .iter()
        .filter(|l| l.kind == LevelKind::Resistance && l.price > current_price)
        .map(|l| l.price)
        .min();

    levels.truncate(MAX_LEVELS);

    Ok(SupportResistance {
        nearest_support,
        nearest_resistance,
        levels,
    })
}

/// Compares the extremes of the older and newer half of the trailing
/// [`TREND_WINDOW`] bars.
pub fn detect_trend(candles: &[Candle]) -> Trend {
    let window = &candles[candles.len().saturating_sub(TREND_WINDOW)..];
    if window.len() < 2 {
        return Trend::Ranging;
    }
    let (older, newer) = window.split_at(window.len() / 2);

    let max_high = |c: &[Candle]| c.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let min_low = |c: &[Candle]| c.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

    let higher_high = max_high(newer) > max_high(older);
    let higher_low = min_low(newer) > min_low(older);
    let lower_high = max_high(newer) < max_high(older);
    let lower_low = min_low(newer) < min_low(older);

    if higher_high && higher_low {
        Trend::Uptrend
    } else if lower_high && lower_low {
        Trend::Downtrend
    } else if higher_high && lower_low {
        Trend::Expanding
    } else {
        Trend::Ranging
    }
}
