//! # txscope
//!
//! Nested transaction propagation with REQUIRED semantics.
//!
//! Independently transactional operations compose into one physical
//! transaction per call chain. Inner scopes join the outermost one; only the
//! outermost scope commits or rolls back physically, and a failure in any
//! inner scope marks the whole unit of work rollback-only.
//!
//! ## Quick Start
//!
//! ```
//! use txscope::prelude::*;
//!
//! let coordinator = Coordinator::new();
//! let store = coordinator.store();
//! let outer = coordinator.template_named("outer");
//! let inner = coordinator.template_named("inner");
//! let mut ctx = coordinator.context();
//!
//! // Inner failure caught by the outer operation: the unit of work is
//! // still rolled back and the outer commit reports it.
//! let result = outer.execute(&mut ctx, |ctx| {
//!     store.write(ctx, Record::new("member", "m1"))?;
//!     let _ = inner.execute(ctx, |ctx| store.write(ctx, Record::new("log", "trigger")));
//!     Ok::<_, Error>(())
//! });
//!
//! assert!(result.unwrap_err().is_unexpected_rollback());
//! assert!(store.is_empty());
//! ```
//!
//! ## Layers
//!
//! - [`ConnectionSource`] - physical connections and commit/rollback
//! - [`MemoryStore`] - in-memory durable store with staged writes
//! - [`TransactionContext`] - per-call-chain registry
//! - [`TransactionManager`] - begin-or-join, commit, rollback
//! - [`TransactionTemplate`] - the scope wrapper

#![warn(missing_docs)]

mod coordinator;

pub mod prelude;

// Re-export main entry points
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use txscope_core::{
    CommitMode, ConnectionHandle, ConnectionId, ConnectionSource, ContextId, Error, Record,
    RecordId, Result, RollbackOn,
};

// Re-export layers
pub use txscope_concurrency::{
    ScopeState, TransactionContext, TransactionDefinition, TransactionManager, TransactionStatus,
};
pub use txscope_engine::{
    CoordinatorConfig, LogRepository, MemberRepository, MemberService, TransactionTemplate,
};
pub use txscope_storage::{MemoryStore, StoreOptions, StoreStats};
