//! SQLite backend for the Tether network store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every [`NetworkStore`] call runs as a
//! single SQLite transaction.
//!
//! [`NetworkStore`]: tether_core::store::NetworkStore

mod encode;
mod schema;
mod store;
mod tx;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
