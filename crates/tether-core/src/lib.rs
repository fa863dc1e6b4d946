//! Core types and rules for the Tether network.
//!
//! This crate owns the connection graph and messaging state machines. It is
//! deliberately free of database and I/O dependencies: storage backends
//! implement [`tx::NetworkTx`] and [`store::NetworkStore`], and the rules in
//! [`connection`], [`message`] and [`workflow`] run against them.

pub mod account;
pub mod connection;
pub mod error;
pub mod message;
pub mod store;
pub mod tx;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
