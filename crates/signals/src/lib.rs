//! # Clon Signal Constructor
//!
//! Turns an `AnalysisReport` into a concrete `Signal`: direction, entry band,
//! stop-loss, two targets and a risk/reward string.
//!
//! - **Layer 2 Logic:** Depends on `core-types` and `analysis`, and nothing that does I/O.
//! - A neutral report is not an error. `build` simply returns `None`.

pub mod error;
pub mod levels;

pub use error::SignalError;

use analysis::AnalysisReport;
use chrono::Utc;
use core_types::{Signal, SignalStatus, Timeframe};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Builds signals that all carry the same disclaimer text.
#[derive(Debug, Clone)]
pub struct SignalConstructor {
    disclaimer: String,
}

impl SignalConstructor {
    pub fn new(disclaimer: impl Into<String>) -> Self {
        Self {
            disclaimer: disclaimer.into(),
        }
    }

    /// Builds a signal for `asset` from `report`.
    ///
    /// The entry band is centred on `current_price` (the live ticker price),
    /// while the targets are measured from the report's last close.
    ///
    /// Returns `Ok(None)` when the report's bias is neutral.
    pub fn build(
        &self,
        asset: &str,
        timeframe: Timeframe,
        current_price: Decimal,
        report: &AnalysisReport,
    ) -> Result<Option<Signal>, SignalError> {
        let Some(direction) = report.bias.direction() else {
            tracing::info!(asset, %timeframe, "Neutral bias, no signal");
            return Ok(None);
        };
        if current_price <= Decimal::ZERO {
            return Err(SignalError::InvalidPrice(current_price));
        }

        let entry = levels::entry_zone(current_price)?;
        let stop_loss = levels::stop_loss(direction, report)?;
        let targets = levels::targets(direction, report)?;
        let risk_reward = levels::risk_reward(entry.mid, stop_loss, targets[0])?;

        tracing::debug!(
            asset,
            %direction,
            entry_mid = %entry.mid,
            %stop_loss,
            target_1 = %targets[0],
            %risk_reward,
            "Signal constructed"
        );

        Ok(Some(Signal {
            signal_id: Uuid::new_v4(),
            asset: asset.to_string(),
            direction,
            entry,
            stop_loss,
            targets,
            timeframe,
            risk_reward,
            reasoning: report.summary.join(" | "),
            status: SignalStatus::Open,
            disclaimer: self.disclaimer.clone(),
            created_at: Utc::now(),
        }))
    }
}
