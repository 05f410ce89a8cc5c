//! Per-call-chain transaction context
//!
//! A `TransactionContext` is created once at the entry of a call chain and
//! threaded through every transactional scope as `&mut`. It holds at most one
//! bound physical connection plus the shared rollback-only marker of the
//! physical transaction running on it.
//!
//! Only the [`TransactionManager`](crate::TransactionManager) binds, unbinds
//! or marks the connection; operation bodies read the bound connection id to
//! route store calls.

use txscope_core::{ConnectionHandle, ConnectionId, ContextId};

/// Connection bound to a context for the lifetime of one physical transaction
#[derive(Debug)]
struct BoundConnection {
    handle: ConnectionHandle,
    /// Aggregate marker set by any participating scope that rolled back
    rollback_only: bool,
    /// Name of the outermost scope that began the physical transaction
    name: String,
}

/// Registry of the active physical transaction for one call chain
#[derive(Debug)]
pub struct TransactionContext {
    id: ContextId,
    bound: Option<BoundConnection>,
    depth: usize,
}

impl TransactionContext {
    /// Create an empty context for a new call chain
    pub fn new() -> Self {
        Self {
            id: ContextId::new(),
            bound: None,
            depth: 0,
        }
    }

    /// Context identity
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Connection of the active physical transaction, if any
    pub fn connection_id(&self) -> Option<ConnectionId> {
        self.bound.as_ref().map(|b| b.handle.id())
    }

    /// Whether a physical transaction is active on this chain
    pub fn is_active(&self) -> bool {
        self.bound.is_some()
    }

    /// Number of logical scopes currently open
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the active physical transaction was marked rollback-only
    pub fn is_rollback_only(&self) -> bool {
        self.bound.as_ref().is_some_and(|b| b.rollback_only)
    }

    /// Name of the active physical transaction
    pub fn transaction_name(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.name.as_str())
    }

    pub(crate) fn bind(&mut self, handle: ConnectionHandle, name: String) {
        debug_assert!(self.bound.is_none(), "context already holds a connection");
        self.bound = Some(BoundConnection {
            handle,
            rollback_only: false,
            name,
        });
    }

    pub(crate) fn unbind(&mut self) -> Option<ConnectionHandle> {
        self.bound.take().map(|b| b.handle)
    }

    pub(crate) fn mark_rollback_only(&mut self) {
        if let Some(bound) = self.bound.as_mut() {
            bound.rollback_only = true;
        }
    }

    pub(crate) fn enter(&mut self) -> usize {
        self.depth += 1;
        self.depth
    }

    pub(crate) fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Default for TransactionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TransactionContext {
    fn drop(&mut self) {
        if let Some(bound) = &self.bound {
            tracing::warn!(
                context = %self.id,
                connection = %bound.handle.id(),
                depth = self.depth,
                "TransactionContext dropped with an active transaction; connection was never released"
            );
        }
    }
}
