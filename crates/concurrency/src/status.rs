//! Logical transaction scopes
//!
//! One [`TransactionStatus`] exists per logical scope. Many statuses may share
//! a physical connection; only the status with `is_new_transaction() == true`
//! owns the physical commit or rollback.
//!
//! ## State Machine
//!
//! ```text
//! begin_or_join ──► Active ──commit──► Committed
//!                     │
//!                     └────rollback──► RolledBack
//! ```
//!
//! Terminal states are entered exactly once.

use txscope_core::{ConnectionId, ContextId};

/// Default name for transactions started without an explicit definition
pub const DEFAULT_TRANSACTION_NAME: &str = "txscope";

/// Attributes requested by a transactional scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDefinition {
    /// Name used in log lines and in `UnexpectedRollback`
    pub name: String,
}

impl TransactionDefinition {
    /// Definition with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TransactionDefinition {
    fn default() -> Self {
        Self::named(DEFAULT_TRANSACTION_NAME)
    }
}

/// Lifecycle of one logical scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeState {
    /// Begun or joined; waiting for commit or rollback
    Active,
    /// Commit completed (physically for new transactions, logically otherwise)
    Committed,
    /// Rolled back, or marked rollback-only when participating
    RolledBack,
}

impl std::fmt::Display for ScopeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeState::Active => write!(f, "active"),
            ScopeState::Committed => write!(f, "committed"),
            ScopeState::RolledBack => write!(f, "rolled back"),
        }
    }
}

/// Handle for one logical transaction scope
#[derive(Debug)]
pub struct TransactionStatus {
    pub(crate) context: ContextId,
    pub(crate) connection: ConnectionId,
    pub(crate) new_transaction: bool,
    pub(crate) rollback_only: bool,
    pub(crate) depth: usize,
    pub(crate) state: ScopeState,
    pub(crate) name: String,
}

impl TransactionStatus {
    pub(crate) fn new(
        context: ContextId,
        connection: ConnectionId,
        new_transaction: bool,
        depth: usize,
        name: String,
    ) -> Self {
        Self {
            context,
            connection,
            new_transaction,
            rollback_only: false,
            depth,
            state: ScopeState::Active,
            name,
        }
    }

    /// True only for the scope that physically began the transaction
    pub fn is_new_transaction(&self) -> bool {
        self.new_transaction
    }

    /// Whether this scope asked for rollback via [`set_rollback_only`](Self::set_rollback_only)
    pub fn is_rollback_only(&self) -> bool {
        self.rollback_only
    }

    /// Request rollback of this scope without failing the operation.
    ///
    /// A later `commit` of this status is processed as a rollback.
    pub fn set_rollback_only(&mut self) {
        self.rollback_only = true;
    }

    /// Connection shared by every scope of this physical transaction
    pub fn connection_id(&self) -> ConnectionId {
        self.connection
    }

    /// Nesting depth at which this scope was opened (outermost = 1)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Current lifecycle state
    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// Whether commit or rollback already ran
    pub fn is_completed(&self) -> bool {
        self.state != ScopeState::Active
    }

    /// Transaction name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn complete(&mut self, state: ScopeState) {
        self.state = state;
    }
}
