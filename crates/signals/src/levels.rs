use crate::error::SignalError;
use analysis::{AnalysisReport, round_dp2};
use core_types::{Direction, EntryZone};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// Half-width of the entry band around the current price.
pub const ENTRY_BUFFER: Decimal = dec!(0.003);

fn overflow(what: &str) -> SignalError {
    SignalError::Overflow(what.to_string())
}

/// `price * factor` rounded to 2 decimals, or an error if it does not fit a `Decimal`.
pub fn scaled(price: Decimal, factor: Decimal, what: &str) -> Result<Decimal, SignalError> {
    price
        .checked_mul(factor)
        .map(round_dp2)
        .ok_or_else(|| overflow(what))
}

/// Entry band of ±0.3% around `price`, the same for both directions.
pub fn entry_zone(price: Decimal) -> Result<EntryZone, SignalError> {
    let buffer = price
        .checked_mul(ENTRY_BUFFER)
        .ok_or_else(|| overflow("entry buffer"))?;
    Ok(EntryZone {
        low: round_dp2(price.checked_sub(buffer).ok_or_else(|| overflow("entry low"))?),
        mid: round_dp2(price),
        high: round_dp2(price.checked_add(buffer).ok_or_else(|| overflow("entry high"))?),
    })
}

/// The tighter of the structural stop and a stop just beyond the 50 EMA.
///
/// Without a structural level the 200 EMA, pushed out by 1%, stands in for it.
pub fn stop_loss(direction: Direction, report: &AnalysisReport) -> Result<Decimal, SignalError> {
    let ema = &report.indicators.ema;
    let sr = &report.structure.support_resistance;
    match direction {
        Direction::Long => {
            let floor = match sr.nearest_support {
                Some(level) => level,
                None => scaled(ema.ema200, dec!(0.99), "stop loss")?,
            };
            Ok(floor.max(scaled(ema.ema50, dec!(0.99), "stop loss")?))
        }
        Direction::Short => {
            let ceiling = match sr.nearest_resistance {
                Some(level) => level,
                None => scaled(ema.ema200, dec!(1.01), "stop loss")?,
            };
            Ok(ceiling.min(scaled(ema.ema50, dec!(1.01), "stop loss")?))
        }
    }
}

/// First target is the next structural level in the trade's direction
/// (or 2.5% away), the second is always 5% away.
pub fn targets(direction: Direction, report: &AnalysisReport) -> Result<[Decimal; 2], SignalError> {
    let price = report.current_price;
    let sr = &report.structure.support_resistance;
    let (level, near, far) = match direction {
        Direction::Long => (sr.nearest_resistance, dec!(1.025), dec!(1.05)),
        Direction::Short => (sr.nearest_support, dec!(0.975), dec!(0.95)),
    };
    let first = match level {
        Some(level) => level,
        None => scaled(price, near, "first target")?,
    };
    Ok([first, scaled(price, far, "second target")?])
}

/// Formats `reward / risk` as `1:<ratio>` with one decimal.
///
/// A stop on the entry has no risk distance and yields `"0"`.
pub fn risk_reward(entry: Decimal, stop: Decimal, target: Decimal) -> Result<String, SignalError> {
    let risk = entry.checked_sub(stop).ok_or_else(|| overflow("risk"))?.abs();
    if risk.is_zero() {
        return Ok("0".to_string());
    }
    let reward = target.checked_sub(entry).ok_or_else(|| overflow("reward"))?.abs();
    let ratio = reward
        .checked_div(risk)
        .ok_or_else(|| overflow("risk/reward ratio"))?
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!("1:{}", ratio.normalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_band_is_symmetric() {
        let zone = entry_zone(dec!(100)).unwrap();
        assert_eq!(zone.low, dec!(99.70));
        assert_eq!(zone.mid, dec!(100));
        assert_eq!(zone.high, dec!(100.30));

        let zone = entry_zone(dec!(64123.45)).unwrap();
        assert_eq!(zone.low, dec!(63931.08));
        assert_eq!(zone.high, dec!(64315.82));
    }

    #[test]
    fn risk_reward_formatting() {
        let rr = |entry, stop, target| risk_reward(entry, stop, target).unwrap();
        assert_eq!(rr(dec!(100), dec!(97.02), dec!(102.5)), "1:0.8");
        assert_eq!(rr(dec!(100), dec!(96), dec!(104)), "1:1");
        assert_eq!(rr(dec!(100), dec!(98), dec!(105)), "1:2.5");
        // 1.25 rounds away from zero
        assert_eq!(rr(dec!(100), dec!(96), dec!(105)), "1:1.3");
        assert_eq!(rr(dec!(100), dec!(104), dec!(90)), "1:2.5");
    }

    #[test]
    fn zero_risk_is_a_sentinel() {
        assert_eq!(risk_reward(dec!(100), dec!(100), dec!(105)).unwrap(), "0");
    }

    #[test]
    fn oversized_prices_are_errors_not_panics() {
        assert!(matches!(entry_zone(Decimal::MAX), Err(SignalError::Overflow(_))));
        assert!(matches!(
            scaled(Decimal::MAX, dec!(1.05), "second target"),
            Err(SignalError::Overflow(ref what)) if what == "second target"
        ));
        assert!(matches!(
            risk_reward(dec!(0.01), dec!(0.0000000000000000000000000001), Decimal::MAX),
            Err(SignalError::Overflow(_))
        ));
    }

    #[test]
    fn scaling_rounds_to_cents() {
        assert_eq!(scaled(dec!(101.01), dec!(0.99), "stop loss").unwrap(), dec!(100));
        assert_eq!(scaled(dec!(200), dec!(0.985), "stop loss").unwrap(), dec!(197));
    }
}
