//! Scope wrapper for transactional operations
//!
//! [`TransactionTemplate::execute`] runs an operation inside a REQUIRED
//! transaction scope:
//!
//! ```text
//! 1. begin_or_join()
//! 2. run operation
//! 3. Ok                        -> commit()      (UnexpectedRollback replaces Ok)
//! 4. Err, triggers rollback    -> rollback()    (original error returned)
//! 5. Err, no rollback          -> commit()      (original error returned
//!                                                unless commit fails)
//! 6. panic                     -> rollback()    (panic resumed)
//! ```
//!
//! Templates nest freely: an operation run by one template may call other
//! templated operations with the same context, and they join the same
//! physical transaction.

use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, warn};
use txscope_concurrency::{
    TransactionContext, TransactionDefinition, TransactionManager, TransactionStatus,
};
use txscope_core::{Error, RollbackOn};

/// Runs operations inside begin-or-join transaction scopes
#[derive(Debug, Clone)]
pub struct TransactionTemplate {
    manager: TransactionManager,
    definition: TransactionDefinition,
}

impl TransactionTemplate {
    /// Template using the default transaction definition
    pub fn new(manager: TransactionManager) -> Self {
        Self::with_definition(manager, TransactionDefinition::default())
    }

    /// Template using `definition` for every scope it opens
    pub fn with_definition(manager: TransactionManager, definition: TransactionDefinition) -> Self {
        Self {
            manager,
            definition,
        }
    }

    /// Copy of this template with a different transaction name
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self::with_definition(self.manager.clone(), TransactionDefinition::named(name))
    }

    /// Definition used for new scopes
    pub fn definition(&self) -> &TransactionDefinition {
        &self.definition
    }

    /// Underlying transaction manager
    pub fn manager(&self) -> &TransactionManager {
        &self.manager
    }

    /// Run `op` inside a transaction scope
    pub fn execute<T, E, F>(&self, ctx: &mut TransactionContext, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut TransactionContext) -> Result<T, E>,
        E: From<Error> + RollbackOn,
    {
        self.execute_with_status(ctx, |ctx, _status| op(ctx))
    }

    /// Run `op` inside a transaction scope, giving it access to the scope's
    /// status (e.g. to call [`TransactionStatus::set_rollback_only`])
    pub fn execute_with_status<T, E, F>(&self, ctx: &mut TransactionContext, op: F) -> Result<T, E>
    where
        F: FnOnce(&mut TransactionContext, &mut TransactionStatus) -> Result<T, E>,
        E: From<Error> + RollbackOn,
    {
        let mut status = self.manager.begin_or_join(ctx, &self.definition)?;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| op(&mut *ctx, &mut status)));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                match self.manager.rollback(ctx, &mut status) {
                    Ok(()) => warn!(
                        name = %status.name(),
                        depth = status.depth(),
                        "Operation panicked; scope rolled back"
                    ),
                    Err(rollback_err) => error!(
                        name = %status.name(),
                        depth = status.depth(),
                        error = %rollback_err,
                        "Operation panicked and rollback failed"
                    ),
                }
                panic::resume_unwind(payload);
            }
        };

        match result {
            Ok(value) => {
                self.manager.commit(ctx, &mut status)?;
                Ok(value)
            }
            Err(e) if e.triggers_rollback() => {
                if let Err(rollback_err) = self.manager.rollback(ctx, &mut status) {
                    error!(
                        name = %status.name(),
                        depth = status.depth(),
                        error = %rollback_err,
                        "Rollback failed; original operation error is propagated"
                    );
                }
                Err(e)
            }
            Err(e) => {
                debug!(
                    name = %status.name(),
                    "Operation failed with a non-rollback error; committing scope"
                );
                self.manager.commit(ctx, &mut status)?;
                Err(e)
            }
        }
    }
}
