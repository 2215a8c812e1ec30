use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Calculation error: arithmetic overflow in metric '{0}'")]
    Overflow(String),
}
