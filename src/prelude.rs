//! Convenient imports for txscope.
//!
//! This module re-exports the most commonly used types so you can get started
//! with a single import:
//!
//! ```
//! use txscope::prelude::*;
//!
//! let coordinator = Coordinator::new();
//! let mut ctx = coordinator.context();
//! let id = coordinator
//!     .member_service()
//!     .members()
//!     .save(&mut ctx, "alice")
//!     .unwrap();
//! assert_eq!(id.as_u64(), 1);
//! ```

// Main entry point
pub use crate::coordinator::{Coordinator, CoordinatorBuilder};

// Error handling
pub use txscope_core::{Error, Result, RollbackOn};

// Scopes
pub use txscope_concurrency::{TransactionContext, TransactionStatus};
pub use txscope_engine::TransactionTemplate;

// Core types
pub use txscope_core::{Record, RecordId};
