use crate::error::AnalysisError;
use rust_decimal::prelude::*;

/// Rounds half away from zero at the 2nd decimal.
pub fn round_dp2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a kernel output into a report value.
///
/// Non-finite values are an error rather than something to publish.
pub fn round_f64(value: f64, field: &str) -> Result<Decimal, AnalysisError> {
    if !value.is_finite() {
        return Err(AnalysisError::Calculation(format!(
            "{field} is not a finite number ({value})"
        )));
    }
    Decimal::from_f64(value)
        .map(round_dp2)
        .ok_or_else(|| AnalysisError::Calculation(format!("{field} is out of range ({value})")))
}
