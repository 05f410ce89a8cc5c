//! Core types and traits for txscope
//!
//! This crate defines the vocabulary shared by every layer:
//! - Identifiers: ContextId, ConnectionId, RecordId
//! - Record: the store payload
//! - ConnectionHandle and the ConnectionSource trait
//! - Error, Result and the RollbackOn classification trait

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod connection;
pub mod error;
pub mod types;

pub use connection::{ConnectionHandle, ConnectionSource};
pub use error::{Error, Result, RollbackOn};
pub use types::{CommitMode, ConnectionId, ContextId, Record, RecordId};
