use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Rejected by the signal lifecycle: {0}")]
    Lifecycle(#[from] CoreError),

    #[error("A stored row could not be read back: {0}")]
    InvalidRow(String),

    #[error("The requested data was not found in the database.")]
    NotFound,
}
