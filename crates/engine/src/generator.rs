use crate::error::EngineError;
use analysis::MIN_CANDLES;
use api_client::MarketData;
use configuration::WatchlistEntry;
use core_types::{Signal, SignalRecord};
use database::SignalStore;
use futures::future::join_all;
use signals::SignalConstructor;
use std::sync::Arc;

/// What happened to one watchlist entry during a pass.
#[derive(Debug)]
pub enum AssetOutcome {
    /// A signal was built and stored.
    Published(SignalRecord),
    /// The analysis came out neutral.
    Skipped,
    Failed(EngineError),
}

/// Per-entry results of a watchlist pass, in watchlist order.
#[derive(Debug, Default)]
pub struct WatchlistReport {
    pub outcomes: Vec<(WatchlistEntry, AssetOutcome)>,
}

impl WatchlistReport {
    pub fn published(&self) -> impl Iterator<Item = &SignalRecord> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            AssetOutcome::Published(record) => Some(record),
            _ => None,
        })
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, AssetOutcome::Skipped))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&WatchlistEntry, &EngineError)> {
        self.outcomes.iter().filter_map(|(entry, outcome)| match outcome {
            AssetOutcome::Failed(e) => Some((entry, e)),
            _ => None,
        })
    }
}

/// Runs fetch, analysis, signal construction and persistence for watchlist entries.
pub struct SignalGenerator {
    market: Arc<dyn MarketData>,
    store: Arc<dyn SignalStore>,
    constructor: SignalConstructor,
    candle_count: usize,
}

impl SignalGenerator {
    pub fn new(
        market: Arc<dyn MarketData>,
        store: Arc<dyn SignalStore>,
        constructor: SignalConstructor,
        candle_count: usize,
    ) -> Result<Self, EngineError> {
        if candle_count < MIN_CANDLES {
            return Err(EngineError::Configuration(format!(
                "candle_count must be at least {MIN_CANDLES}, got {candle_count}"
            )));
        }
        Ok(Self {
            market,
            store,
            constructor,
            candle_count,
        })
    }

    /// Builds a signal for one asset without storing it.
    ///
    /// Candles and ticker are fetched one after the other so that the signal's
    /// levels and its entry come from the same moment.
    pub async fn generate_for_asset(
        &self,
        entry: &WatchlistEntry,
    ) -> Result<Option<Signal>, EngineError> {
        let candles = self
            .market
            .fetch_candles(&entry.symbol, entry.timeframe, self.candle_count)
            .await?;
        let ticker = self.market.fetch_ticker(&entry.symbol).await?;
        let report = analysis::analyze(&candles, entry.timeframe)?;

        let signal =
            self.constructor
                .build(&entry.symbol, entry.timeframe, ticker.price, &report)?;
        Ok(signal)
    }

    async fn publish(&self, entry: &WatchlistEntry) -> Result<Option<SignalRecord>, EngineError> {
        match self.generate_for_asset(entry).await? {
            Some(signal) => Ok(Some(self.store.save_signal(&signal).await?)),
            None => Ok(None),
        }
    }

    /// Generates and stores the signal for one asset, logging the outcome.
    pub async fn process_asset(&self, entry: &WatchlistEntry) -> AssetOutcome {
        match self.publish(entry).await {
            Ok(Some(record)) => {
                tracing::info!(
                    symbol = %entry.symbol,
                    timeframe = %entry.timeframe,
                    direction = %record.direction,
                    rr = %record.rr_ratio,
                    "Signal published"
                );
                AssetOutcome::Published(record)
            }
            Ok(None) => {
                tracing::warn!(symbol = %entry.symbol, timeframe = %entry.timeframe, "Neutral, skipping signal");
                AssetOutcome::Skipped
            }
            Err(e) => {
                tracing::error!(symbol = %entry.symbol, timeframe = %entry.timeframe, error = %e, "Signal generation failed");
                AssetOutcome::Failed(e)
            }
        }
    }

    /// One pass over the whole watchlist.
    pub async fn run_watchlist(&self, watchlist: &[WatchlistEntry]) -> WatchlistReport {
        self.run_watchlist_with(watchlist, |_, _| {}).await
    }

    /// Like [`Self::run_watchlist`], calling `on_done` as each entry finishes.
    ///
    /// Entries run concurrently. A failing entry never stops the others.
    pub async fn run_watchlist_with<F>(&self, watchlist: &[WatchlistEntry], on_done: F) -> WatchlistReport
    where
        F: Fn(&WatchlistEntry, &AssetOutcome) + Sync,
    {
        tracing::info!(assets = watchlist.len(), "Starting watchlist pass");

        let on_done = &on_done;
        let tasks = watchlist.iter().map(|entry| async move {
            let outcome = self.process_asset(entry).await;
            on_done(entry, &outcome);
            (entry.clone(), outcome)
        });
        let report = WatchlistReport {
            outcomes: join_all(tasks).await,
        };

        tracing::info!(
            published = report.published().count(),
            skipped = report.skipped(),
            failed = report.failures().count(),
            "Watchlist pass finished"
        );
        report
    }
}
