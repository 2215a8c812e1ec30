use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("The provided current price ({0}) is zero or negative.")]
    InvalidPrice(Decimal),

    #[error("Decimal overflow while calculating {0}")]
    Overflow(String),
}
