pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{Direction, SignalStatus, Timeframe};
pub use error::CoreError;
pub use structs::{Candle, EntryZone, Signal, SignalRecord, Ticker};

/// Shortest candle history an analysis accepts; the slowest average needs this many bars.
pub const MIN_CANDLES: usize = 200;
