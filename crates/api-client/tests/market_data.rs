use api_client::{ApiError, BinanceClient, BybitClient, FallbackMarketData, MarketData};
use configuration::MarketDataConfig;
use core_types::Timeframe;
use mockito::{Matcher, Server};
use rust_decimal_macros::dec;

fn config(binance: &Server, bybit: &Server) -> MarketDataConfig {
    MarketDataConfig {
        binance_base_url: binance.url(),
        bybit_base_url: bybit.url(),
        candle_timeout_ms: 2_000,
        ticker_timeout_ms: 2_000,
    }
}

const BINANCE_KLINES: &str = r#"[
  [1700000000000, "100.0", "101.5", "99.5", "101.0", "1200.5", 1700003599999, "121000.0", 42, "600.0", "60500.0", "0"],
  [1700003600000, "101.0", "102.0", "100.5", "101.8", "980.25", 1700007199999, "99500.0", 37, "490.0", "49700.0", "0"]
]"#;

const BYBIT_KLINES: &str = r#"{
  "retCode": 0,
  "retMsg": "OK",
  "result": {
    "category": "linear",
    "symbol": "BTCUSDT",
    "list": [
      ["1700003600000", "101.0", "102.0", "100.5", "101.8", "980.25", "99500.0"],
      ["1700000000000", "100.0", "101.5", "99.5", "101.0", "1200.5", "121000.0"]
    ]
  }
}"#;

#[tokio::test]
async fn binance_klines_are_parsed_in_order() {
    let mut binance = Server::new_async().await;
    let bybit = Server::new_async().await;
    let mock = binance
        .mock("GET", "/klines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("symbol".into(), "BTCUSDT".into()),
            Matcher::UrlEncoded("interval".into(), "4h".into()),
            Matcher::UrlEncoded("limit".into(), "2".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BINANCE_KLINES)
        .create_async()
        .await;

    let client = BinanceClient::new(&config(&binance, &bybit)).unwrap();
    let candles = client.fetch_candles("BTCUSDT", Timeframe::H4, 2).await.unwrap();

    mock.assert_async().await;
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].time.timestamp_millis(), 1_700_000_000_000);
    assert_eq!(candles[0].high, 101.5);
    assert_eq!(candles[1].close, 101.8);
    assert_eq!(candles[1].volume, 980.25);
}

#[tokio::test]
async fn bybit_klines_are_reversed_to_oldest_first() {
    let binance = Server::new_async().await;
    let mut bybit = Server::new_async().await;
    let mock = bybit
        .mock("GET", "/kline")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("category".into(), "linear".into()),
            Matcher::UrlEncoded("interval".into(), "60".into()),
        ]))
        .with_status(200)
        .with_body(BYBIT_KLINES)
        .create_async()
        .await;

    let client = BybitClient::new(&config(&binance, &bybit)).unwrap();
    let candles = client.fetch_candles("BTCUSDT", Timeframe::H1, 2).await.unwrap();

    mock.assert_async().await;
    assert!(candles[0].time < candles[1].time);
    assert_eq!(candles[0].open, 100.0);
    assert_eq!(candles[1].close, 101.8);
}

#[tokio::test]
async fn bybit_error_code_is_surfaced() {
    let binance = Server::new_async().await;
    let mut bybit = Server::new_async().await;
    bybit
        .mock("GET", "/kline")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"retCode": 10001, "retMsg": "params error: symbol invalid", "result": {}}"#)
        .create_async()
        .await;

    let client = BybitClient::new(&config(&binance, &bybit)).unwrap();
    let err = client.fetch_candles("NOPE", Timeframe::H1, 10).await.unwrap_err();
    assert!(matches!(err, ApiError::ApiError(ref msg) if msg.contains("symbol invalid")), "{err}");
}

#[tokio::test]
async fn ticker_is_read_as_decimals() {
    let mut binance = Server::new_async().await;
    let bybit = Server::new_async().await;
    binance
        .mock("GET", "/ticker/24hr")
        .match_query(Matcher::UrlEncoded("symbol".into(), "ETHUSDT".into()))
        .with_status(200)
        .with_body(
            r#"{"symbol":"ETHUSDT","lastPrice":"3412.55000000","priceChangePercent":"-1.234",
                "quoteVolume":"987654321.12","volume":"290000.1"}"#,
        )
        .create_async()
        .await;

    let client = BinanceClient::new(&config(&binance, &bybit)).unwrap();
    let ticker = client.fetch_ticker("ETHUSDT").await.unwrap();

    assert_eq!(ticker.symbol, "ETHUSDT");
    assert_eq!(ticker.price, dec!(3412.55));
    assert_eq!(ticker.change_24h, dec!(-1.234));
    assert_eq!(ticker.volume_24h, dec!(987654321.12));
}

#[tokio::test]
async fn binance_error_body_is_reported() {
    let mut binance = Server::new_async().await;
    let bybit = Server::new_async().await;
    binance
        .mock("GET", "/ticker/24hr")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#)
        .create_async()
        .await;

    let client = BinanceClient::new(&config(&binance, &bybit)).unwrap();
    let err = client.fetch_ticker("NOPE").await.unwrap_err();
    assert!(err.to_string().contains("Invalid symbol."), "{err}");
}

#[tokio::test]
async fn candles_fall_back_to_bybit() {
    let mut binance = Server::new_async().await;
    let mut bybit = Server::new_async().await;
    let primary = binance
        .mock("GET", "/klines")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;
    let secondary = bybit
        .mock("GET", "/kline")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(BYBIT_KLINES)
        .create_async()
        .await;

    let market = FallbackMarketData::new(&config(&binance, &bybit)).unwrap();
    let candles = market.fetch_candles("BTCUSDT", Timeframe::H1, 2).await.unwrap();

    primary.assert_async().await;
    secondary.assert_async().await;
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].open, 100.0);
}

#[tokio::test]
async fn ticker_has_no_fallback() {
    let mut binance = Server::new_async().await;
    let mut bybit = Server::new_async().await;
    binance
        .mock("GET", "/ticker/24hr")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;
    let untouched = bybit
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let market = FallbackMarketData::new(&config(&binance, &bybit)).unwrap();
    assert!(market.fetch_ticker("BTCUSDT").await.is_err());
    untouched.assert_async().await;
}

#[tokio::test]
async fn both_candle_sources_failing_is_an_error() {
    let mut binance = Server::new_async().await;
    let mut bybit = Server::new_async().await;
    binance
        .mock("GET", "/klines")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    bybit
        .mock("GET", "/kline")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;

    let market = FallbackMarketData::new(&config(&binance, &bybit)).unwrap();
    let result = market.fetch_candles("BTCUSDT", Timeframe::H1, 5).await;
    assert!(matches!(result, Err(ApiError::ApiError(_))));
}
