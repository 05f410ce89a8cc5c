//! Error types for the transaction coordinator
//!
//! Three families of failure flow through the system:
//!
//! | Family | Variants | Raised by |
//! |--------|----------|-----------|
//! | Store failure | `RecordRejected`, `Store`, `ConnectionClosed`, `UnknownConnection` | durable store |
//! | Unexpected rollback | `UnexpectedRollback` | commit of a transaction marked rollback-only |
//! | Illegal state | `IllegalTransactionState` | completing a scope twice or out of order |

use crate::types::ConnectionId;
use thiserror::Error;

/// All coordinator and store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The store refused a record whose content matches its trigger value
    #[error("record rejected by store: {value}")]
    RecordRejected {
        /// Content that triggered the rejection
        value: String,
    },

    /// Any other store-level failure
    #[error("store error: {0}")]
    Store(String),

    /// Operation issued against a connection that was already released
    #[error("connection {0} is closed")]
    ConnectionClosed(ConnectionId),

    /// Connection was never handed out by this source
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    /// Commit was requested but an inner scope had marked the transaction
    /// rollback-only, so it was rolled back instead
    #[error("transaction '{transaction}' rolled back because it has been marked as rollback-only")]
    UnexpectedRollback {
        /// Name of the transaction whose commit was converted
        transaction: String,
    },

    /// Scope completed twice, completed out of LIFO order, or completed
    /// against the wrong context
    #[error("illegal transaction state: {0}")]
    IllegalTransactionState(String),

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable error code, e.g. for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            Error::RecordRejected { .. } => "RecordRejected",
            Error::Store(_) => "StoreFailure",
            Error::ConnectionClosed(_) => "ConnectionClosed",
            Error::UnknownConnection(_) => "UnknownConnection",
            Error::UnexpectedRollback { .. } => "UnexpectedRollback",
            Error::IllegalTransactionState(_) => "IllegalTransactionState",
            Error::Config(_) => "Config",
        }
    }

    /// Check if this error originated in the durable store.
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::RecordRejected { .. }
                | Error::Store(_)
                | Error::ConnectionClosed(_)
                | Error::UnknownConnection(_)
        )
    }

    /// Check if a commit was silently converted into a rollback.
    pub fn is_unexpected_rollback(&self) -> bool {
        matches!(self, Error::UnexpectedRollback { .. })
    }

    /// Check if this is an illegal-state error (a bug in the caller).
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Error::IllegalTransactionState(_))
    }

    /// Check if this is a record rejection.
    pub fn is_record_rejected(&self) -> bool {
        matches!(self, Error::RecordRejected { .. })
    }
}

/// Decides whether an error escaping a transactional scope aborts the
/// unit of work.
///
/// Every error triggers rollback unless its type overrides
/// [`RollbackOn::triggers_rollback`]. Application error types opt in with an
/// empty impl:
///
/// ```
/// use txscope_core::RollbackOn;
///
/// #[derive(Debug)]
/// enum AppError {
///     Validation(String),
///     Backend(String),
/// }
///
/// impl RollbackOn for AppError {
///     fn triggers_rollback(&self) -> bool {
///         !matches!(self, AppError::Validation(_))
///     }
/// }
///
/// assert!(AppError::Backend("down".into()).triggers_rollback());
/// assert!(!AppError::Validation("bad".into()).triggers_rollback());
/// ```
pub trait RollbackOn {
    /// Whether this error must roll the enclosing scope back
    fn triggers_rollback(&self) -> bool {
        true
    }
}

impl RollbackOn for Error {}
