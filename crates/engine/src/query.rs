use crate::error::EngineError;
use analysis::{AnalysisReport, Bias, SupportResistance};
use api_client::MarketData;
use configuration::QueryConfig;
use core_types::{Direction, EntryZone, Ticker, Timeframe};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use signals::SignalError;
use signals::levels::{entry_zone, scaled};
use std::sync::Arc;

const RISK_NOTES: [&str; 2] = [
    "Wait for candle close confirmation before entering.",
    "Avoid overleveraging. Manage position size carefully.",
];

/// A single-timeframe analysis together with the live ticker.
#[derive(Debug, Clone, Serialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub ticker: Ticker,
    pub report: AnalysisReport,
    pub disclaimer: String,
}

/// A trade idea sketched from the live price and the confirmation timeframe's levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSetup {
    pub direction: Direction,
    pub entry: EntryZone,
    pub stop_loss: Decimal,
    pub targets: [Decimal; 2],
}

/// The two-timeframe answer to "what is this asset doing?".
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub symbol: String,
    pub current_price: Decimal,
    /// Taken from the primary timeframe.
    pub bias: Bias,
    pub confluence: String,
    pub setup: Option<QuickSetup>,
    pub lines: Vec<String>,
    pub risk_notes: Vec<String>,
}

/// Describes whether two timeframes agree.
pub fn confluence(primary: (Timeframe, Bias), confirmation: (Timeframe, Bias)) -> String {
    if primary.1 == confirmation.1 {
        format!("Both timeframes align: {}", primary.1)
    } else {
        format!(
            "Mixed: {} {}, {} {}",
            primary.0, primary.1, confirmation.0, confirmation.1
        )
    }
}

/// Entry band, stop and targets around `price`, or `None` for a neutral bias.
///
/// Without a structural level the stop sits 1.5% away and the first target 2.5% away.
pub fn quick_setup(
    bias: Bias,
    price: Decimal,
    levels: &SupportResistance,
) -> Result<Option<QuickSetup>, SignalError> {
    let Some(direction) = bias.direction() else {
        return Ok(None);
    };

    let (stop_level, target_level, stop_pct, near_pct, far_pct) = match direction {
        Direction::Long => (
            levels.nearest_support,
            levels.nearest_resistance,
            dec!(0.985),
            dec!(1.025),
            dec!(1.05),
        ),
        Direction::Short => (
            levels.nearest_resistance,
            levels.nearest_support,
            dec!(1.015),
            dec!(0.975),
            dec!(0.95),
        ),
    };

    let stop_loss = match stop_level {
        Some(level) => level,
        None => scaled(price, stop_pct, "stop loss")?,
    };
    let first_target = match target_level {
        Some(level) => level,
        None => scaled(price, near_pct, "first target")?,
    };

    Ok(Some(QuickSetup {
        direction,
        entry: entry_zone(price)?,
        stop_loss,
        targets: [first_target, scaled(price, far_pct, "second target")?],
    }))
}

fn side(price: Decimal, level: Decimal) -> &'static str {
    if price > level { "above" } else { "below" }
}

/// Answers on-demand questions about a single symbol.
pub struct QueryResponder {
    market: Arc<dyn MarketData>,
    settings: QueryConfig,
    candle_count: usize,
    disclaimer: String,
}

impl QueryResponder {
    pub fn new(
        market: Arc<dyn MarketData>,
        settings: QueryConfig,
        candle_count: usize,
        disclaimer: impl Into<String>,
    ) -> Self {
        Self {
            market,
            settings,
            candle_count,
            disclaimer: disclaimer.into(),
        }
    }

    /// Runs the analysis on one timeframe. Failures are returned to the caller as they are.
    pub async fn analyze_symbol(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<SymbolAnalysis, EngineError> {
        let (candles, ticker) = tokio::try_join!(
            self.market.fetch_candles(symbol, timeframe, self.candle_count),
            self.market.fetch_ticker(symbol),
        )?;
        let report = analysis::analyze(&candles, timeframe)?;

        Ok(SymbolAnalysis {
            symbol: symbol.to_string(),
            ticker,
            report,
            disclaimer: self.disclaimer.clone(),
        })
    }

    /// Analyzes the primary and confirmation timeframes and combines them.
    pub async fn overview(&self, symbol: &str) -> Result<Overview, EngineError> {
        let primary_tf = self.settings.primary_timeframe;
        let confirm_tf = self.settings.confirmation_timeframe;

        let (primary_candles, confirm_candles, ticker) = tokio::try_join!(
            self.market.fetch_candles(symbol, primary_tf, self.candle_count),
            self.market.fetch_candles(symbol, confirm_tf, self.candle_count),
            self.market.fetch_ticker(symbol),
        )?;
        let primary = analysis::analyze(&primary_candles, primary_tf)?;
        let confirm = analysis::analyze(&confirm_candles, confirm_tf)?;

        let price = ticker.price;
        let confluence = confluence((primary_tf, primary.bias), (confirm_tf, confirm.bias));
        let setup = quick_setup(primary.bias, price, &confirm.structure.support_resistance)?;

        let ind = &confirm.indicators;
        let lines = vec![
            format!("Trend ({primary_tf}): {}", primary.structure.trend),
            format!("Trend ({confirm_tf}): {}", confirm.structure.trend),
            format!(
                "EMA: Price {} 200 EMA | {} 50 EMA",
                side(price, ind.ema.ema200),
                side(price, ind.ema.ema50)
            ),
            format!(
                "RSI ({confirm_tf}): {} ({})",
                ind.rsi.value.normalize(),
                ind.rsi.signal
            ),
            format!("MACD ({confirm_tf}): {}", ind.macd.crossover),
            format!("Volume: {}", ind.volume.signal),
            format!("Confluence: {confluence}"),
        ];

        let mut risk_notes: Vec<String> = RISK_NOTES.iter().map(|n| n.to_string()).collect();
        risk_notes.push(self.disclaimer.clone());

        tracing::info!(symbol, bias = %primary.bias, %confluence, "Overview built");

        Ok(Overview {
            symbol: symbol.to_string(),
            current_price: price,
            bias: primary.bias,
            confluence,
            setup,
            lines,
            risk_notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(support: Option<Decimal>, resistance: Option<Decimal>) -> SupportResistance {
        SupportResistance {
            nearest_support: support,
            nearest_resistance: resistance,
            levels: vec![],
        }
    }

    #[test]
    fn confluence_wording() {
        assert_eq!(
            confluence((Timeframe::H4, Bias::Bullish), (Timeframe::H1, Bias::Bullish)),
            "Both timeframes align: Bullish"
        );
        assert_eq!(
            confluence((Timeframe::H4, Bias::Bearish), (Timeframe::H1, Bias::Neutral)),
            "Mixed: 4H Bearish, 1H Neutral / Wait"
        );
    }

    #[test]
    fn neutral_has_no_setup() {
        assert!(quick_setup(Bias::Neutral, dec!(100), &levels(None, None)).unwrap().is_none());
    }

    #[test]
    fn long_setup_uses_levels_when_present() {
        let setup = quick_setup(Bias::Bullish, dec!(100), &levels(Some(dec!(97.5)), Some(dec!(103))))
            .unwrap()
            .unwrap();
        assert_eq!(setup.direction, Direction::Long);
        assert_eq!(setup.entry.low, dec!(99.7));
        assert_eq!(setup.entry.high, dec!(100.3));
        assert_eq!(setup.stop_loss, dec!(97.5));
        assert_eq!(setup.targets, [dec!(103), dec!(105)]);
    }

    #[test]
    fn long_setup_falls_back_to_percentages() {
        let setup = quick_setup(Bias::Bullish, dec!(200), &levels(None, None)).unwrap().unwrap();
        assert_eq!(setup.stop_loss, dec!(197));
        assert_eq!(setup.targets, [dec!(205), dec!(210)]);
    }

    #[test]
    fn short_setup_mirrors() {
        let setup = quick_setup(Bias::Bearish, dec!(200), &levels(None, None)).unwrap().unwrap();
        assert_eq!(setup.direction, Direction::Short);
        assert_eq!(setup.stop_loss, dec!(203));
        assert_eq!(setup.targets, [dec!(195), dec!(190)]);

        let setup = quick_setup(Bias::Bearish, dec!(200), &levels(Some(dec!(192)), Some(dec!(204))))
            .unwrap()
            .unwrap();
        assert_eq!(setup.stop_loss, dec!(204));
        assert_eq!(setup.targets[0], dec!(192));
    }

    #[test]
    fn oversized_price_is_an_overflow_error() {
        let result = quick_setup(Bias::Bullish, Decimal::MAX, &levels(None, None));
        assert!(matches!(result, Err(SignalError::Overflow(_))));
    }
}
