//! # Clon Analytics Engine
//!
//! This crate computes the track record of published signals: how many were
//! resolved, how many hit a target, and the average and worst realized move.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of external systems.
//!   It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** `PerformanceEngine` takes stored signal records as input
//!   and produces a `SignalPerformance` as output.
//!
//! ## Public API
//!
//! - `PerformanceEngine`: The struct that contains the calculation logic.
//! - `SignalPerformance`: The summary it produces.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::PerformanceEngine;
pub use error::AnalyticsError;
pub use report::SignalPerformance;
