use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient candle data: need at least {required} candles, got {provided}")]
    InsufficientData { required: usize, provided: usize },

    #[error("An error occurred during indicator calculation: {0}")]
    Calculation(String),
}
