use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Market data error: {0}")]
    MarketData(#[from] api_client::ApiError),

    #[error("Database error: {0}")]
    Database(#[from] database::DbError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] analysis::AnalysisError),

    #[error("Signal construction error: {0}")]
    Signal(#[from] signals::SignalError),
}
