//! Indicator kernels and the code that turns their latest outputs into an
//! [`IndicatorSet`].
//!
//! The kernels follow the conventional definitions the classifier thresholds
//! were tuned against:
//! - EMA: multiplier `2 / (period + 1)`, seeded with the SMA of the first
//!   `period` inputs, no output before that.
//! - RSI: Wilder smoothing, seeded with the plain average gain/loss of the
//!   first `period` changes.
//! - MACD: `EMA(fast) - EMA(slow)`, signal line is an EMA of the MACD line.
//!
//! They implement `ta`'s streaming traits and are fed one close at a time.

use crate::error::AnalysisError;
use crate::report::{
    EmaSet, IndicatorSet, MacdCrossover, MacdReading, RsiReading, RsiSignal, VolumeReading,
    VolumeSignal,
};
use crate::rounding::round_f64;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use ta::errors::{Result as TaResult, TaError};
use ta::indicators::SimpleMovingAverage as Sma;
use ta::{Next, Period, Reset};

pub const EMA_PERIODS: [usize; 4] = [9, 21, 50, 200];
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const VOLUME_WINDOW: usize = 20;

const RSI_OVERBOUGHT: Decimal = dec!(70);
const RSI_OVERSOLD: Decimal = dec!(30);
const VOLUME_HIGH: Decimal = dec!(1.5);
const VOLUME_LOW: Decimal = dec!(0.6);

// ==============================================================================
// Kernels
// ==============================================================================

/// SMA-seeded exponential moving average.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    k: f64,
    seed: Sma,
    seen: usize,
    current: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> TaResult<Self> {
        if period == 0 {
            return Err(TaError::InvalidParameter);
        }
        Ok(Self {
            period,
            k: 2.0 / (period as f64 + 1.0),
            seed: Sma::new(period)?,
            seen: 0,
            current: None,
        })
    }
}

impl Period for Ema {
    fn period(&self) -> usize {
        self.period
    }
}

impl Next<f64> for Ema {
    type Output = Option<f64>;

    fn next(&mut self, input: f64) -> Self::Output {
        match self.current {
            Some(prev) => self.current = Some((input - prev) * self.k + prev),
            None => {
                self.seen += 1;
                let average = self.seed.next(input);
                if self.seen == self.period {
                    self.current = Some(average);
                }
            }
        }
        self.current
    }
}

impl Reset for Ema {
    fn reset(&mut self) {
        self.seed.reset();
        self.seen = 0;
        self.current = None;
    }
}

/// Relative strength index with Wilder smoothing.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    prev_close: Option<f64>,
    changes: usize,
    gain_sum: f64,
    loss_sum: f64,
    averages: Option<(f64, f64)>,
}

impl Rsi {
    pub fn new(period: usize) -> TaResult<Self> {
        if period == 0 {
            return Err(TaError::InvalidParameter);
        }
        Ok(Self {
            period,
            prev_close: None,
            changes: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            averages: None,
        })
    }

    /// A window without any movement has no momentum in either direction and
    /// reads as the midpoint.
    fn value(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_gain == 0.0 && avg_loss == 0.0 {
            50.0
        } else if avg_loss == 0.0 {
            100.0
        } else if avg_gain == 0.0 {
            0.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Period for Rsi {
    fn period(&self) -> usize {
        self.period
    }
}

impl Next<f64> for Rsi {
    type Output = Option<f64>;

    fn next(&mut self, input: f64) -> Self::Output {
        let prev = self.prev_close.replace(input)?;
        let change = input - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        let n = self.period as f64;

        self.averages = match self.averages {
            Some((avg_gain, avg_loss)) => Some((
                (avg_gain * (n - 1.0) + gain) / n,
                (avg_loss * (n - 1.0) + loss) / n,
            )),
            None => {
                self.changes += 1;
                self.gain_sum += gain;
                self.loss_sum += loss;
                (self.changes == self.period).then(|| (self.gain_sum / n, self.loss_sum / n))
            }
        };

        self.averages
            .map(|(avg_gain, avg_loss)| Self::value(avg_gain, avg_loss))
    }
}

impl Reset for Rsi {
    fn reset(&mut self) {
        self.prev_close = None;
        self.changes = 0;
        self.gain_sum = 0.0;
        self.loss_sum = 0.0;
        self.averages = None;
    }
}

/// One MACD bar. `signal` and `histogram` stay empty until the signal EMA warms up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdOutput {
    pub macd: f64,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> TaResult<Self> {
        if fast >= slow {
            return Err(TaError::InvalidParameter);
        }
        Ok(Self {
            fast: Ema::new(fast)?,
            slow: Ema::new(slow)?,
            signal: Ema::new(signal)?,
        })
    }
}

impl Next<f64> for Macd {
    type Output = Option<MacdOutput>;

    fn next(&mut self, input: f64) -> Self::Output {
        let fast = self.fast.next(input);
        let slow = self.slow.next(input);
        let macd = fast? - slow?;
        let signal = self.signal.next(macd);
        Some(MacdOutput {
            macd,
            signal,
            histogram: signal.map(|s| macd - s),
        })
    }
}

impl Reset for Macd {
    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.signal.reset();
    }
}

// ==============================================================================
// Indicator set
// ==============================================================================

fn kernel_error(name: &str, e: TaError) -> AnalysisError {
    AnalysisError::Calculation(format!("Failed to initialize {name}: {e:?}"))
}

fn no_value(name: &str) -> AnalysisError {
    AnalysisError::Calculation(format!("{name} produced no value for the given series"))
}

/// Feeds the whole series and keeps the last output.
fn last_value<I>(indicator: &mut I, values: &[f64]) -> Option<f64>
where
    I: Next<f64, Output = Option<f64>>,
{
    values.iter().fold(None, |_, &v| indicator.next(v))
}

pub fn calc_ema(closes: &[f64], period: usize) -> Result<Decimal, AnalysisError> {
    let mut ema = Ema::new(period).map_err(|e| kernel_error("EMA", e))?;
    let value = last_value(&mut ema, closes).ok_or_else(|| no_value("EMA"))?;
    round_f64(value, &format!("ema{period}"))
}

pub fn calc_rsi(closes: &[f64]) -> Result<RsiReading, AnalysisError> {
    let mut rsi = Rsi::new(RSI_PERIOD).map_err(|e| kernel_error("RSI", e))?;
    let raw = last_value(&mut rsi, closes).ok_or_else(|| no_value("RSI"))?;
    let value = round_f64(raw, "rsi")?;

    let signal = if value > RSI_OVERBOUGHT {
        RsiSignal::Overbought
    } else if value < RSI_OVERSOLD {
        RsiSignal::Oversold
    } else {
        RsiSignal::Neutral
    };

    Ok(RsiReading { value, signal })
}

/// Compares the current histogram with the previous bar's.
pub fn classify_crossover(prev_histogram: f64, histogram: f64) -> MacdCrossover {
    if histogram > 0.0 && prev_histogram <= 0.0 {
        MacdCrossover::BullishCrossover
    } else if histogram < 0.0 && prev_histogram >= 0.0 {
        MacdCrossover::BearishCrossover
    } else if histogram > 0.0 {
        MacdCrossover::Bullish
    } else {
        MacdCrossover::Bearish
    }
}

pub fn calc_macd(closes: &[f64]) -> Result<MacdReading, AnalysisError> {
    let mut macd = Macd::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL)
        .map_err(|e| kernel_error("MACD", e))?;

    let mut prev: Option<MacdOutput> = None;
    let mut last: Option<MacdOutput> = None;
    for &close in closes {
        if let Some(output) = macd.next(close) {
            prev = last.replace(output);
        }
    }

    let last = last.ok_or_else(|| no_value("MACD"))?;
    let (signal, histogram) = last
        .signal
        .zip(last.histogram)
        .ok_or_else(|| no_value("MACD signal line"))?;
    let prev_histogram = prev
        .and_then(|p| p.histogram)
        .ok_or_else(|| no_value("previous MACD histogram"))?;

    Ok(MacdReading {
        macd: round_f64(last.macd, "macd")?,
        signal: round_f64(signal, "macd signal")?,
        histogram: round_f64(histogram, "macd histogram")?,
        crossover: classify_crossover(prev_histogram, histogram),
    })
}

/// Latest volume against the mean of the trailing 20 volumes.
///
/// A window with no traded volume at all reads as a zero ratio.
pub fn analyze_volume(volumes: &[f64]) -> Result<VolumeReading, AnalysisError> {
    let current = *volumes.last().ok_or_else(|| no_value("volume"))?;
    let window = &volumes[volumes.len().saturating_sub(VOLUME_WINDOW)..];

    let mut sma = Sma::new(VOLUME_WINDOW).map_err(|e| kernel_error("volume SMA", e))?;
    let avg20 = window.iter().fold(0.0, |_, &v| sma.next(v));
    let ratio = if avg20 > 0.0 { current / avg20 } else { 0.0 };
    let ratio = round_f64(ratio, "volume ratio")?;

    let signal = if ratio > VOLUME_HIGH {
        VolumeSignal::High
    } else if ratio < VOLUME_LOW {
        VolumeSignal::Low
    } else {
        VolumeSignal::Average
    };

    Ok(VolumeReading {
        current: round_f64(current, "volume")?,
        avg20: round_f64(avg20, "average volume")?,
        ratio,
        signal,
    })
}

pub fn compute_indicators(closes: &[f64], volumes: &[f64]) -> Result<IndicatorSet, AnalysisError> {
    let [p9, p21, p50, p200] = EMA_PERIODS;
    let ema = EmaSet {
        ema9: calc_ema(closes, p9)?,
        ema21: calc_ema(closes, p21)?,
        ema50: calc_ema(closes, p50)?,
        ema200: calc_ema(closes, p200)?,
    };
    let rsi = calc_rsi(closes)?;
    let macd = calc_macd(closes)?;
    let volume = analyze_volume(volumes)?;

    tracing::debug!(?ema, ?rsi, ?macd, ?volume, "Indicators computed");

    Ok(IndicatorSet {
        ema,
        rsi,
        macd,
        volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_is_seeded_with_the_simple_average() {
        let mut ema = Ema::new(3).unwrap();
        assert_eq!(ema.next(1.0), None);
        assert_eq!(ema.next(2.0), None);
        assert_eq!(ema.next(3.0), Some(2.0));
        // k = 0.5: (4 - 2) * 0.5 + 2
        assert_eq!(ema.next(4.0), Some(3.0));
    }

    #[test]
    fn ema_tracks_a_linear_series_with_constant_lag() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let mut ema = Ema::new(3).unwrap();
        assert_eq!(last_value(&mut ema, &values), Some(9.0));
    }

    #[test]
    fn ema_reset_forgets_the_seed() {
        let mut ema = Ema::new(2).unwrap();
        ema.next(10.0);
        ema.next(20.0);
        ema.reset();
        assert_eq!(ema.next(1.0), None);
        assert_eq!(ema.next(3.0), Some(2.0));
    }

    #[test]
    fn zero_periods_are_rejected() {
        assert!(Ema::new(0).is_err());
        assert!(Rsi::new(0).is_err());
        assert!(Macd::new(26, 12, 9).is_err());
    }

    #[test]
    fn rsi_needs_period_changes_before_reporting() {
        let mut rsi = Rsi::new(14).unwrap();
        let outputs: Vec<Option<f64>> = (0..15).map(|i| rsi.next(100.0 + i as f64)).collect();
        assert!(outputs[..14].iter().all(Option::is_none));
        assert_eq!(outputs[14], Some(100.0));
    }

    #[test]
    fn rsi_extremes_and_flat_input() {
        let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        let flat = vec![100.0; 30];

        assert_eq!(last_value(&mut Rsi::new(14).unwrap(), &rising), Some(100.0));
        assert_eq!(last_value(&mut Rsi::new(14).unwrap(), &falling), Some(0.0));
        assert_eq!(last_value(&mut Rsi::new(14).unwrap(), &flat), Some(50.0));
    }

    #[test]
    fn rsi_balanced_moves_read_fifty() {
        let zigzag: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 100.0 } else { 101.0 }).collect();
        let value = last_value(&mut Rsi::new(14).unwrap(), &zigzag).unwrap();
        assert!((value - 50.0).abs() < 1e-9, "got {value}");
    }

    #[test]
    fn rsi_uses_wilder_smoothing_after_the_seed() {
        let mut rsi = Rsi::new(2).unwrap();
        rsi.next(10.0);
        rsi.next(11.0); // +1
        // seed: gain 1/2, loss 1/2
        assert_eq!(rsi.next(10.0), Some(50.0));
        // gain (0.5 * 1 + 2) / 2 = 1.25, loss (0.5 * 1 + 0) / 2 = 0.25
        let value = rsi.next(12.0).unwrap();
        assert!((value - (100.0 - 100.0 / (1.0 + 5.0))).abs() < 1e-9);
    }

    #[test]
    fn macd_warms_up_in_stages() {
        let mut macd = Macd::new(12, 26, 9).unwrap();
        let outputs: Vec<Option<MacdOutput>> = (0..40).map(|i| macd.next(100.0 + i as f64)).collect();
        assert!(outputs[..25].iter().all(Option::is_none));
        assert!(outputs[25].is_some_and(|o| o.signal.is_none()));
        assert!(outputs[33].is_some_and(|o| o.histogram.is_some()));
    }

    #[test]
    fn macd_of_flat_series_is_zero() {
        let reading = calc_macd(&vec![250.0; 60]).unwrap();
        assert_eq!(reading.macd, Decimal::ZERO);
        assert_eq!(reading.signal, Decimal::ZERO);
        assert_eq!(reading.histogram, Decimal::ZERO);
        assert_eq!(reading.crossover, MacdCrossover::Bearish);
    }

    #[test]
    fn crossover_follows_histogram_sign_change() {
        assert_eq!(classify_crossover(-0.5, 0.2), MacdCrossover::BullishCrossover);
        assert_eq!(classify_crossover(0.0, 0.2), MacdCrossover::BullishCrossover);
        assert_eq!(classify_crossover(0.5, -0.2), MacdCrossover::BearishCrossover);
        assert_eq!(classify_crossover(0.0, -0.2), MacdCrossover::BearishCrossover);
        assert_eq!(classify_crossover(0.1, 0.2), MacdCrossover::Bullish);
        assert_eq!(classify_crossover(-0.1, -0.2), MacdCrossover::Bearish);
        assert_eq!(classify_crossover(0.0, 0.0), MacdCrossover::Bearish);
    }

    #[test]
    fn rsi_thresholds_classify_the_reading() {
        let rising: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        assert_eq!(calc_rsi(&rising).unwrap().signal, RsiSignal::Overbought);
        let falling: Vec<f64> = rising.iter().rev().copied().collect();
        assert_eq!(calc_rsi(&falling).unwrap().signal, RsiSignal::Oversold);
        assert_eq!(calc_rsi(&vec![5.0; 30]).unwrap().signal, RsiSignal::Neutral);
    }

    #[test]
    fn volume_conviction_levels() {
        let mut volumes = vec![100.0; 30];
        *volumes.last_mut().unwrap() = 300.0;
        let high = analyze_volume(&volumes).unwrap();
        // avg of 19 x 100 + 300 = 110
        assert_eq!(high.avg20, dec!(110));
        assert_eq!(high.ratio, dec!(2.73));
        assert_eq!(high.signal, VolumeSignal::High);

        *volumes.last_mut().unwrap() = 20.0;
        let low = analyze_volume(&volumes).unwrap();
        assert_eq!(low.signal, VolumeSignal::Low);

        let average = analyze_volume(&vec![100.0; 30]).unwrap();
        assert_eq!(average.ratio, dec!(1));
        assert_eq!(average.signal, VolumeSignal::Average);
    }

    #[test]
    fn volume_without_trading_is_low_conviction() {
        let reading = analyze_volume(&vec![0.0; 25]).unwrap();
        assert_eq!(reading.ratio, Decimal::ZERO);
        assert_eq!(reading.signal, VolumeSignal::Low);
    }
}
