use analysis::Bias;
use api_client::{ApiError, MarketData};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use configuration::{QueryConfig, WatchlistEntry};
use core_types::{Candle, Direction, Signal, SignalRecord, Ticker, Timeframe};
use database::{DbError, SignalStore};
use engine::{AssetOutcome, EngineError, QueryResponder, SignalGenerator};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use signals::SignalConstructor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const DISCLAIMER: &str = "For information only.";

fn series(closes: impl IntoIterator<Item = f64>) -> Vec<Candle> {
    closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| Candle {
            time: Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap(),
            open: close,
            high: close * 1.001,
            low: close * 0.999,
            close,
            volume: 1_000.0,
        })
        .collect()
}

fn rally() -> Vec<Candle> {
    series((0..300).map(|i| 100.0 * 1.01_f64.powi(i)))
}

fn selloff() -> Vec<Candle> {
    series((0..300).map(|i| 1_000.0 - 0.01 * (i * i) as f64))
}

fn flat() -> Vec<Candle> {
    (0..300)
        .map(|i| Candle {
            time: Utc.timestamp_opt(1_700_000_000 + i * 3600, 0).unwrap(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume: 1_000.0,
        })
        .collect()
}

#[derive(Default)]
struct FakeMarket {
    candles: HashMap<(String, Timeframe), Vec<Candle>>,
    prices: HashMap<String, Decimal>,
    requested_limits: Mutex<Vec<usize>>,
}

impl FakeMarket {
    fn with(mut self, symbol: &str, timeframe: Timeframe, candles: Vec<Candle>) -> Self {
        let last = Decimal::try_from(candles[candles.len() - 1].close).unwrap().round_dp(2);
        self.prices.entry(symbol.to_string()).or_insert(last);
        self.candles.insert((symbol.to_string(), timeframe), candles);
        self
    }

    fn price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }
}

#[async_trait]
impl MarketData for FakeMarket {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, ApiError> {
        self.requested_limits.lock().unwrap().push(limit);
        let candles = self
            .candles
            .get(&(symbol.to_string(), timeframe))
            .ok_or_else(|| ApiError::ApiError(format!("unknown symbol {symbol}")))?;
        Ok(candles[candles.len().saturating_sub(limit)..].to_vec())
    }

    async fn fetch_ticker(&self, symbol: &str) -> Result<Ticker, ApiError> {
        let price = self
            .prices
            .get(symbol)
            .copied()
            .ok_or_else(|| ApiError::ApiError(format!("unknown symbol {symbol}")))?;
        Ok(Ticker {
            symbol: symbol.to_string(),
            price,
            change_24h: dec!(1.5),
            volume_24h: dec!(1000000),
        })
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<SignalRecord>>,
    reject: Vec<String>,
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn save_signal(&self, signal: &Signal) -> Result<SignalRecord, DbError> {
        if self.reject.contains(&signal.asset) {
            return Err(DbError::NotFound);
        }
        let record = SignalRecord::from(signal);
        self.saved.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

fn generator(market: Arc<FakeMarket>, store: Arc<MemoryStore>) -> SignalGenerator {
    SignalGenerator::new(market, store, SignalConstructor::new(DISCLAIMER), 250).unwrap()
}

#[tokio::test]
async fn watchlist_pass_publishes_skips_and_survives_failures() {
    let market = Arc::new(
        FakeMarket::default()
            .with("BTCUSDT", Timeframe::H1, rally())
            .with("ETHUSDT", Timeframe::H1, flat())
            .with("SOLUSDT", Timeframe::H4, selloff()),
    );
    let store = Arc::new(MemoryStore::default());
    let watchlist = vec![
        WatchlistEntry::new("BTCUSDT", Timeframe::H1),
        WatchlistEntry::new("ETHUSDT", Timeframe::H1),
        WatchlistEntry::new("DOGEUSDT", Timeframe::H1),
        WatchlistEntry::new("SOLUSDT", Timeframe::H4),
    ];

    let done = Mutex::new(Vec::new());
    let report = generator(market.clone(), store.clone())
        .run_watchlist_with(&watchlist, |entry, _| done.lock().unwrap().push(entry.symbol.clone()))
        .await;

    assert_eq!(report.outcomes.len(), 4);
    assert_eq!(done.lock().unwrap().len(), 4);
    assert!(matches!(report.outcomes[0].1, AssetOutcome::Published(ref r) if r.direction == Direction::Long));
    assert!(matches!(report.outcomes[1].1, AssetOutcome::Skipped));
    assert!(matches!(
        report.outcomes[2].1,
        AssetOutcome::Failed(EngineError::MarketData(_))
    ));
    assert!(matches!(report.outcomes[3].1, AssetOutcome::Published(ref r) if r.direction == Direction::Short));

    assert_eq!(report.published().count(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failures().count(), 1);

    let saved = store.saved.lock().unwrap();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|r| r.disclaimer == DISCLAIMER));
    assert!(market.requested_limits.lock().unwrap().iter().all(|&l| l == 250));
}

#[tokio::test]
async fn storage_failure_is_reported_per_asset() {
    let market = Arc::new(
        FakeMarket::default()
            .with("BTCUSDT", Timeframe::H1, rally())
            .with("BNBUSDT", Timeframe::H4, rally()),
    );
    let store = Arc::new(MemoryStore {
        reject: vec!["BTCUSDT".to_string()],
        ..MemoryStore::default()
    });
    let watchlist = vec![
        WatchlistEntry::new("BTCUSDT", Timeframe::H1),
        WatchlistEntry::new("BNBUSDT", Timeframe::H4),
    ];

    let report = generator(market, store.clone()).run_watchlist(&watchlist).await;

    assert!(matches!(
        report.outcomes[0].1,
        AssetOutcome::Failed(EngineError::Database(_))
    ));
    assert!(matches!(report.outcomes[1].1, AssetOutcome::Published(_)));
    assert_eq!(store.saved.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn short_history_is_an_analysis_failure() {
    let market = Arc::new(FakeMarket::default().with("XRPUSDT", Timeframe::H1, rally()[..150].to_vec()));
    let store = Arc::new(MemoryStore::default());

    let outcome = generator(market, store)
        .process_asset(&WatchlistEntry::new("XRPUSDT", Timeframe::H1))
        .await;

    assert!(matches!(
        outcome,
        AssetOutcome::Failed(EngineError::Analysis(analysis::AnalysisError::InsufficientData {
            provided: 150,
            ..
        }))
    ));
}

#[tokio::test]
async fn entry_comes_from_the_live_ticker() {
    let market = Arc::new(
        FakeMarket::default()
            .with("BTCUSDT", Timeframe::H1, rally())
            .price("BTCUSDT", dec!(2000)),
    );
    let signal = generator(market, Arc::new(MemoryStore::default()))
        .generate_for_asset(&WatchlistEntry::new("BTCUSDT", Timeframe::H1))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(signal.entry.mid, dec!(2000));
    assert_eq!(signal.entry.low, dec!(1994));
    assert_eq!(signal.entry.high, dec!(2006));
}

#[test]
fn candle_count_below_minimum_is_rejected() {
    let result = SignalGenerator::new(
        Arc::new(FakeMarket::default()),
        Arc::new(MemoryStore::default()),
        SignalConstructor::new(DISCLAIMER),
        150,
    );
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

fn responder(market: FakeMarket) -> QueryResponder {
    QueryResponder::new(Arc::new(market), QueryConfig::default(), 300, DISCLAIMER)
}

#[tokio::test]
async fn overview_with_agreeing_timeframes() {
    let market = FakeMarket::default()
        .with("SOLUSDT", Timeframe::H4, rally())
        .with("SOLUSDT", Timeframe::H1, rally());

    let overview = responder(market).overview("SOLUSDT").await.unwrap();

    assert_eq!(overview.bias, Bias::Bullish);
    assert_eq!(overview.confluence, "Both timeframes align: Bullish");
    let setup = overview.setup.unwrap();
    assert_eq!(setup.direction, Direction::Long);
    assert!(setup.stop_loss < overview.current_price);
    assert_eq!(overview.lines.len(), 7);
    assert!(overview.lines[0].starts_with("Trend (4H): "));
    assert!(overview.lines[1].starts_with("Trend (1H): "));
    assert_eq!(overview.lines[6], "Confluence: Both timeframes align: Bullish");
    assert_eq!(overview.risk_notes.last().unwrap(), DISCLAIMER);
}

#[tokio::test]
async fn overview_with_mixed_timeframes_follows_the_primary() {
    let market = FakeMarket::default()
        .with("ETHUSDT", Timeframe::H4, flat())
        .with("ETHUSDT", Timeframe::H1, rally());

    let overview = responder(market).overview("ETHUSDT").await.unwrap();

    assert_eq!(overview.bias, Bias::Neutral);
    assert_eq!(overview.confluence, "Mixed: 4H Neutral / Wait, 1H Bullish");
    assert!(overview.setup.is_none());
}

#[tokio::test]
async fn single_timeframe_query_surfaces_errors() {
    let market = FakeMarket::default().with("BTCUSDT", Timeframe::H1, rally());
    let responder = responder(market);

    let analysis = responder.analyze_symbol("BTCUSDT", Timeframe::H1).await.unwrap();
    assert_eq!(analysis.report.bias, Bias::Bullish);
    assert_eq!(analysis.ticker.symbol, "BTCUSDT");
    assert_eq!(analysis.disclaimer, DISCLAIMER);

    let err = responder.analyze_symbol("BTCUSDT", Timeframe::D1).await.unwrap_err();
    assert!(matches!(err, EngineError::MarketData(_)));
}
