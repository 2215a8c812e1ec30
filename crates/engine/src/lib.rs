//! # Clon Engine
//!
//! This crate wires the market-data collaborator, the analysis engine, the
//! signal constructor and persistence into the two things the application does:
//!
//! - **Scheduled generation** (`SignalGenerator`): one pass over the watchlist,
//!   producing and storing a signal for every asset with a clear bias.
//! - **On-demand queries** (`QueryResponder`): a single-timeframe analysis or a
//!   two-timeframe overview for one symbol.
//!
//! Collaborators are held as trait objects (`MarketData`, `SignalStore`) so they
//! can be replaced by in-memory fakes in tests.

pub mod error;
pub mod generator;
pub mod query;

pub use error::EngineError;
pub use generator::{AssetOutcome, SignalGenerator, WatchlistReport};
pub use query::{Overview, QueryResponder, QuickSetup, SymbolAnalysis, confluence, quick_setup};
