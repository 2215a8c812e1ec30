//! # Clon Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It is the permanent archive of published signals.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all database-specific logic. It
//!   provides a clean API to the rest of the application, hiding the underlying SQL.
//! - **Append-Only Signals:** Signals are inserted once and never deleted. The only
//!   mutation is a status update, which must move the signal forward in its lifecycle.
//! - **Asynchronous & Pooled:** All operations are asynchronous and share a
//!   connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: Applies the embedded migrations.
//! - `DbRepository`: Holds the pool and provides the data access methods.
//! - `SignalStore`: The narrow insert-only interface the signal generator depends on.
//! - `DbError`: The specific error types that can be returned from this crate.

pub mod connection;
pub mod error;
pub mod repository;
pub mod store;

pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, DbSignal, plan_status_update};
pub use store::SignalStore;
