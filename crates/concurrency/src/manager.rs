//! Transaction manager for coordinating nested scopes
//!
//! Reconciles any number of nested logical scopes into one physical
//! transaction per call chain (REQUIRED propagation):
//! 1. The first scope on a chain acquires a connection and begins the
//!    physical transaction
//! 2. Nested scopes join it and never touch the connection physically
//! 3. Only the outermost scope commits or rolls back physically
//!
//! Core rules:
//! - A participating rollback only marks the physical transaction rollback-only
//! - A commit of the outermost scope honours that marker: it rolls back and
//!   fails with `UnexpectedRollback`
//! - Scopes complete exactly once, in reverse order of their begin
//!
//! ## Commit Sequence (outermost scope)
//!
//! ```text
//! 1. validate()              - scope is Active, belongs to ctx, is innermost
//! 2. local rollback-only?    - process as an explicit rollback
//! 3. depth decrement
//! 4. unbind connection from ctx
//! 5. marker set?   physical_rollback(), release, Err(UnexpectedRollback)
//! 6. marker clear: physical_commit(), release, Ok(())
//! ```
//!
//! If the physical commit itself fails, the connection is rolled back and
//! released and the commit failure is returned.

use crate::context::TransactionContext;
use crate::status::{ScopeState, TransactionDefinition, TransactionStatus};
use std::sync::Arc;
use tracing::{debug, info, warn};
use txscope_core::error::{Error, Result};
use txscope_core::{ConnectionHandle, ConnectionSource};

/// Begins, joins, commits and rolls back logical transactions
///
/// The manager is stateless apart from its connection source; all
/// per-chain state lives in the [`TransactionContext`] passed to each call,
/// so one manager can serve any number of concurrent call chains.
#[derive(Clone)]
pub struct TransactionManager {
    source: Arc<dyn ConnectionSource>,
}

impl TransactionManager {
    /// Create a manager drawing connections from `source`
    pub fn new(source: Arc<dyn ConnectionSource>) -> Self {
        Self { source }
    }

    /// Begin a physical transaction, or join the one already active on `ctx`
    ///
    /// # Returns
    /// - status with `is_new_transaction() == true` if this call acquired the
    ///   connection
    /// - status with `is_new_transaction() == false` if it joined
    pub fn begin_or_join(
        &self,
        ctx: &mut TransactionContext,
        definition: &TransactionDefinition,
    ) -> Result<TransactionStatus> {
        if let Some(connection) = ctx.connection_id() {
            let depth = ctx.enter();
            debug!(
                connection = %connection,
                depth,
                name = %definition.name,
                "Participating in existing transaction"
            );
            return Ok(TransactionStatus::new(
                ctx.id(),
                connection,
                false,
                depth,
                definition.name.clone(),
            ));
        }

        let mut handle = self.source.acquire_connection()?;
        if let Err(e) = self.source.set_manual_commit(&mut handle) {
            self.source.release_connection(handle);
            return Err(e);
        }

        let connection = handle.id();
        ctx.bind(handle, definition.name.clone());
        let depth = ctx.enter();
        debug!(
            connection = %connection,
            context = %ctx.id(),
            name = %definition.name,
            "Began new transaction"
        );
        Ok(TransactionStatus::new(
            ctx.id(),
            connection,
            true,
            depth,
            definition.name.clone(),
        ))
    }

    /// Complete a scope successfully
    ///
    /// Participating scopes complete logically. The outermost scope commits
    /// physically unless any scope marked the transaction rollback-only, in
    /// which case it rolls back and returns [`Error::UnexpectedRollback`].
    pub fn commit(&self, ctx: &mut TransactionContext, status: &mut TransactionStatus) -> Result<()> {
        self.validate(ctx, status, "commit")?;

        if status.is_rollback_only() {
            debug!(
                name = %status.name,
                depth = status.depth,
                "Scope is marked rollback-only locally; rolling back on commit"
            );
            return self.process_rollback(ctx, status);
        }

        ctx.exit();

        if !status.is_new_transaction() {
            status.complete(ScopeState::Committed);
            debug!(
                connection = %status.connection,
                depth = status.depth,
                "Participating scope completed; commit deferred to outermost scope"
            );
            return Ok(());
        }

        let global_rollback_only = ctx.is_rollback_only();
        let mut handle = self.unbind(ctx, status)?;

        if global_rollback_only {
            warn!(
                connection = %status.connection,
                name = %status.name,
                "Transaction marked rollback-only by a participating scope; rolling back instead of committing"
            );
            let rolled_back = self.source.physical_rollback(&mut handle);
            self.source.release_connection(handle);
            status.complete(ScopeState::RolledBack);
            rolled_back?;
            return Err(Error::UnexpectedRollback {
                transaction: status.name.clone(),
            });
        }

        match self.source.physical_commit(&mut handle) {
            Ok(()) => {
                self.source.release_connection(handle);
                status.complete(ScopeState::Committed);
                info!(connection = %status.connection, name = %status.name, "Committed transaction");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = self.source.physical_rollback(&mut handle) {
                    tracing::error!(
                        connection = %status.connection,
                        commit_error = %e,
                        error = %rollback_err,
                        "Rollback after failed commit also failed"
                    );
                }
                self.source.release_connection(handle);
                status.complete(ScopeState::RolledBack);
                Err(e)
            }
        }
    }

    /// Abort a scope
    ///
    /// The outermost scope rolls back physically. A participating scope only
    /// marks the shared transaction rollback-only; the decision is carried out
    /// when the outermost scope completes.
    pub fn rollback(
        &self,
        ctx: &mut TransactionContext,
        status: &mut TransactionStatus,
    ) -> Result<()> {
        self.validate(ctx, status, "rollback")?;
        self.process_rollback(ctx, status)
    }

    fn process_rollback(
        &self,
        ctx: &mut TransactionContext,
        status: &mut TransactionStatus,
    ) -> Result<()> {
        ctx.exit();

        if !status.is_new_transaction() {
            ctx.mark_rollback_only();
            status.complete(ScopeState::RolledBack);
            warn!(
                connection = %status.connection,
                depth = status.depth,
                name = %status.name,
                "Participating scope failed; marking existing transaction as rollback-only"
            );
            return Ok(());
        }

        let mut handle = self.unbind(ctx, status)?;
        let rolled_back = self.source.physical_rollback(&mut handle);
        self.source.release_connection(handle);
        status.complete(ScopeState::RolledBack);
        info!(connection = %status.connection, name = %status.name, "Rolled back transaction");
        rolled_back
    }

    fn unbind(
        &self,
        ctx: &mut TransactionContext,
        status: &TransactionStatus,
    ) -> Result<ConnectionHandle> {
        ctx.unbind().ok_or_else(|| {
            Error::IllegalTransactionState(format!(
                "no connection bound for outermost scope '{}'",
                status.name
            ))
        })
    }

    /// Reject completion of a scope that is finished, foreign, or not innermost
    fn validate(
        &self,
        ctx: &TransactionContext,
        status: &TransactionStatus,
        op: &str,
    ) -> Result<()> {
        if status.is_completed() {
            return Err(Error::IllegalTransactionState(format!(
                "cannot {} scope '{}': already {}",
                op, status.name, status.state
            )));
        }
        if status.context != ctx.id() {
            return Err(Error::IllegalTransactionState(format!(
                "cannot {} scope '{}': status belongs to another context",
                op, status.name
            )));
        }
        if ctx.connection_id() != Some(status.connection) {
            return Err(Error::IllegalTransactionState(format!(
                "cannot {} scope '{}': {} is not the active connection",
                op, status.name, status.connection
            )));
        }
        if status.depth != ctx.depth() {
            return Err(Error::IllegalTransactionState(format!(
                "cannot {} scope '{}' at depth {}: innermost open scope is at depth {}",
                op,
                status.name,
                status.depth,
                ctx.depth()
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager").finish_non_exhaustive()
    }
}
