//! Concurrency layer for txscope
//!
//! This crate implements REQUIRED transaction propagation:
//! - TransactionContext: per-call-chain registry of the bound connection
//! - TransactionStatus: one handle per logical (nested) scope
//! - TransactionManager: begin-or-join, commit and rollback with
//!   rollback-only propagation from participating scopes

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod manager;
pub mod status;

pub use context::TransactionContext;
pub use manager::TransactionManager;
pub use status::{ScopeState, TransactionDefinition, TransactionStatus, DEFAULT_TRANSACTION_NAME};
