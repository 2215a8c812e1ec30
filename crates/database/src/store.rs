use crate::error::DbError;
use async_trait::async_trait;
use core_types::{Signal, SignalRecord};

/// Where newly built signals are persisted.
///
/// The signal generator only ever inserts, so this is all it needs to know
/// about storage.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn save_signal(&self, signal: &Signal) -> Result<SignalRecord, DbError>;
}
