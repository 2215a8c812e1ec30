use crate::report::{Bias, IndicatorSet, StructureSet};
use rust_decimal::Decimal;

fn side(price: Decimal, level: Decimal) -> &'static str {
    if price > level { "above" } else { "below" }
}

fn or_na(level: Option<Decimal>) -> String {
    level.map_or_else(|| "N/A".to_string(), |v| v.normalize().to_string())
}

/// Human-readable lines in a fixed order: trend, EMA, RSI, MACD, volume,
/// support, resistance, bias.
pub fn build_summary(
    price: Decimal,
    indicators: &IndicatorSet,
    structure: &StructureSet,
    bias: Bias,
) -> Vec<String> {
    let ema = &indicators.ema;
    let macd = &indicators.macd;
    let sign = if macd.histogram > Decimal::ZERO { "+" } else { "" };

    vec![
        format!("Trend: {}", structure.trend),
        format!(
            "EMA: Price {} 200 EMA ({}), {} 50 EMA ({})",
            side(price, ema.ema200),
            ema.ema200.normalize(),
            side(price, ema.ema50),
            ema.ema50.normalize(),
        ),
        format!(
            "RSI: {} ({})",
            indicators.rsi.value.normalize(),
            indicators.rsi.signal
        ),
        format!(
            "MACD: {} | Histogram {}{}",
            macd.crossover,
            sign,
            macd.histogram.normalize()
        ),
        format!(
            "Volume: {} ({}x avg)",
            indicators.volume.signal,
            indicators.volume.ratio.normalize()
        ),
        format!(
            "Nearest Support: {}",
            or_na(structure.support_resistance.nearest_support)
        ),
        format!(
            "Nearest Resistance: {}",
            or_na(structure.support_resistance.nearest_resistance)
        ),
        format!("Bias: {bias}"),
    ]
}
