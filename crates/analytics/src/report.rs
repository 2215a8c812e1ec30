use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Track record of resolved signals.
///
/// Every figure is rounded to two decimals. With no resolved signals all
/// figures are zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalPerformance {
    pub total: usize,
    /// `TP1 Hit`, `TP2 Hit` and `Closed`.
    pub wins: usize,
    /// `SL Hit`.
    pub losses: usize,
    pub win_rate_pct: Decimal,
    /// Mean of the recorded `result_pct` values.
    pub avg_result_pct: Decimal,
    /// Worst recorded `result_pct`.
    pub max_drawdown_pct: Decimal,
}
