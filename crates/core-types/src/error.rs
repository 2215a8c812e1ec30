use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),

    #[error("Signal status cannot move from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },
}
