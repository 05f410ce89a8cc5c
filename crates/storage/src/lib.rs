//! Storage layer for txscope
//!
//! This crate implements the durable store collaborator:
//! - MemoryStore: committed records plus per-connection staged writes
//! - ConnectionSource implementation used by the transaction manager
//! - Trigger value rejection for simulating store failures
//! - StoreStats counters for observing physical commits and rollbacks

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;

pub use memory::{MemoryStore, StoreOptions, StoreStats};
