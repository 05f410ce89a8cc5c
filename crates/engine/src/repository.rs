//! Record repositories
//!
//! Thin, transactional facades over [`MemoryStore`] for the two collections
//! used by [`MemberService`](crate::service::MemberService). `save` runs in
//! its own REQUIRED scope, so it joins the caller's transaction when there is
//! one and opens a fresh one otherwise. `find` is not transactional and reads
//! through whatever the context currently holds.

use std::sync::Arc;
use tracing::info;
use txscope_concurrency::TransactionContext;
use txscope_core::error::Result;
use txscope_core::{Record, RecordId};
use txscope_storage::MemoryStore;

use crate::template::TransactionTemplate;

/// Collection holding members
pub const MEMBER_COLLECTION: &str = "member";

/// Collection holding audit log messages
pub const LOG_COLLECTION: &str = "log";

/// Members, keyed by username
#[derive(Debug, Clone)]
pub struct MemberRepository {
    store: Arc<MemoryStore>,
    template: TransactionTemplate,
}

impl MemberRepository {
    /// Create a repository writing through `store`
    pub fn new(store: Arc<MemoryStore>, template: &TransactionTemplate) -> Self {
        Self {
            store,
            template: template.named("MemberRepository.save"),
        }
    }

    /// Save a member
    pub fn save(&self, ctx: &mut TransactionContext, username: &str) -> Result<RecordId> {
        self.template.execute(ctx, |ctx| {
            info!(username, "Saving member");
            self.store.write(ctx, Record::new(MEMBER_COLLECTION, username))
        })
    }

    /// Find a member by username
    pub fn find(&self, ctx: &TransactionContext, username: &str) -> Result<Option<Record>> {
        self.store.find_by_name(ctx, MEMBER_COLLECTION, username)
    }
}

/// Audit log messages
///
/// Saving a message equal to the store's trigger value fails with
/// `RecordRejected`.
#[derive(Debug, Clone)]
pub struct LogRepository {
    store: Arc<MemoryStore>,
    template: TransactionTemplate,
}

impl LogRepository {
    /// Create a repository writing through `store`
    pub fn new(store: Arc<MemoryStore>, template: &TransactionTemplate) -> Self {
        Self {
            store,
            template: template.named("LogRepository.save"),
        }
    }

    /// Save a log message
    pub fn save(&self, ctx: &mut TransactionContext, message: &str) -> Result<RecordId> {
        self.template.execute(ctx, |ctx| {
            info!(message, "Saving log message");
            self.store.write(ctx, Record::new(LOG_COLLECTION, message))
        })
    }

    /// Find a log entry by message
    pub fn find(&self, ctx: &TransactionContext, message: &str) -> Result<Option<Record>> {
        self.store.find_by_name(ctx, LOG_COLLECTION, message)
    }
}
