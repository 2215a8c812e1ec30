use crate::report::{Bias, IndicatorSet, RsiSignal, Trend};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Votes needed on one side before the bias leaves neutral.
pub const VOTE_THRESHOLD: u8 = 4;

/// Bull and bear votes cast by the five bias rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BiasVotes {
    pub bull: u8,
    pub bear: u8,
}

impl BiasVotes {
    fn cast(&mut self, bullish: Option<bool>) {
        match bullish {
            Some(true) => self.bull += 1,
            Some(false) => self.bear += 1,
            None => {}
        }
    }
}

pub fn tally_votes(price: Decimal, indicators: &IndicatorSet, trend: Trend) -> BiasVotes {
    let mut votes = BiasVotes::default();

    votes.cast(Some(price > indicators.ema.ema50));
    votes.cast(Some(price > indicators.ema.ema200));

    // Stretched readings abstain.
    let rsi = &indicators.rsi;
    let midline = dec!(50);
    votes.cast(if rsi.value > midline && rsi.signal != RsiSignal::Overbought {
        Some(true)
    } else if rsi.value < midline && rsi.signal != RsiSignal::Oversold {
        Some(false)
    } else {
        None
    });

    votes.cast(Some(indicators.macd.histogram > Decimal::ZERO));

    votes.cast(match trend {
        Trend::Uptrend => Some(true),
        Trend::Downtrend => Some(false),
        Trend::Expanding | Trend::Ranging => None,
    });

    votes
}

/// Turns the vote tally into a bias label. With five rules a side can reach
/// the threshold only when the other side cannot.
pub fn classify_bias(votes: BiasVotes) -> Bias {
    if votes.bull >= VOTE_THRESHOLD {
        Bias::Bullish
    } else if votes.bear >= VOTE_THRESHOLD {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}
