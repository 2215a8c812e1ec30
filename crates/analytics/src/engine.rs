use crate::error::AnalyticsError;
use crate::report::SignalPerformance;
use core_types::{SignalRecord, SignalStatus};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

/// A stateless calculator for the published signals' track record.
#[derive(Debug, Default)]
pub struct PerformanceEngine {}

impl PerformanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summarizes every record whose outcome is known.
    ///
    /// Open signals have no outcome yet and invalidated ones never had a
    /// chance to play out, so both are left out.
    pub fn summarize(&self, records: &[SignalRecord]) -> Result<SignalPerformance, AnalyticsError> {
        let resolved: Vec<&SignalRecord> = records
            .iter()
            .filter(|r| !matches!(r.status, SignalStatus::Open | SignalStatus::Invalidated))
            .collect();

        let mut report = SignalPerformance {
            total: resolved.len(),
            ..SignalPerformance::default()
        };
        if resolved.is_empty() {
            return Ok(report);
        }

        report.wins = resolved.iter().filter(|r| r.status.is_win()).count();
        report.losses = resolved
            .iter()
            .filter(|r| r.status == SignalStatus::SlHit)
            .count();
        report.win_rate_pct =
            round2(Decimal::from(report.wins) / Decimal::from(report.total) * dec!(100));

        let results: Vec<Decimal> = resolved.iter().filter_map(|r| r.result_pct).collect();
        if let Some(worst) = results.iter().min() {
            let sum = results
                .iter()
                .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
                .ok_or_else(|| AnalyticsError::Overflow("avg_result_pct".to_string()))?;
            report.avg_result_pct = round2(sum / Decimal::from(results.len()));
            report.max_drawdown_pct = round2(*worst);
        }

        tracing::debug!(?report, "Signal performance summarized");
        Ok(report)
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
