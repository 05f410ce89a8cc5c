//! Member sign-up service
//!
//! Joining saves a member and an audit log message. The variants differ only
//! in how the two repository scopes are composed:
//!
//! | Method | Outer scope | Log failure | Outcome on log failure |
//! |--------|-------------|-------------|------------------------|
//! | `join_v1` | yes | propagated | everything rolled back, `RecordRejected` |
//! | `join_v2` | yes | caught | everything rolled back, `UnexpectedRollback` |
//! | `join_unscoped` | no | propagated | member committed, log rolled back |

use std::sync::Arc;
use tracing::warn;
use txscope_concurrency::TransactionContext;
use txscope_core::error::Result;
use txscope_storage::MemoryStore;

use crate::repository::{LogRepository, MemberRepository};
use crate::template::TransactionTemplate;

/// Signs members up and records an audit message
#[derive(Debug, Clone)]
pub struct MemberService {
    members: MemberRepository,
    logs: LogRepository,
    template: TransactionTemplate,
}

impl MemberService {
    /// Build the service and its repositories over `store`
    pub fn new(store: Arc<MemoryStore>, template: &TransactionTemplate) -> Self {
        Self {
            members: MemberRepository::new(store.clone(), template),
            logs: LogRepository::new(store, template),
            template: template.named("MemberService.join"),
        }
    }

    /// Member repository
    pub fn members(&self) -> &MemberRepository {
        &self.members
    }

    /// Log repository
    pub fn logs(&self) -> &LogRepository {
        &self.logs
    }

    /// Save member and log in one transaction; a log failure propagates
    pub fn join_v1(&self, ctx: &mut TransactionContext, username: &str, message: &str) -> Result<()> {
        self.template.execute(ctx, |ctx| {
            self.members.save(ctx, username)?;
            self.logs.save(ctx, message)?;
            Ok(())
        })
    }

    /// Save member and log in one transaction; a log failure is caught here.
    ///
    /// The caught failure has already marked the shared transaction
    /// rollback-only, so the outer commit fails with `UnexpectedRollback`.
    pub fn join_v2(&self, ctx: &mut TransactionContext, username: &str, message: &str) -> Result<()> {
        self.template.execute(ctx, |ctx| {
            self.members.save(ctx, username)?;
            if let Err(e) = self.logs.save(ctx, message) {
                warn!(message, error = %e, "Failed to save log message; continuing with normal flow");
            }
            Ok(())
        })
    }

    /// Save member and log as two independent transactions
    pub fn join_unscoped(
        &self,
        ctx: &mut TransactionContext,
        username: &str,
        message: &str,
    ) -> Result<()> {
        self.members.save(ctx, username)?;
        self.logs.save(ctx, message)?;
        Ok(())
    }
}
