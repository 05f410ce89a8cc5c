//! Shared fixtures for propagation tests.

pub use txscope::prelude::*;
pub use txscope::{MemoryStore, ScopeState, StoreStats, TransactionDefinition};

use std::sync::Arc;

/// Coordinator with the default trigger value ("trigger")
pub struct TestCoordinator {
    pub coordinator: Coordinator,
    pub store: Arc<MemoryStore>,
}

impl TestCoordinator {
    pub fn new() -> Self {
        let coordinator = Coordinator::builder().trigger_value("trigger").build();
        let store = coordinator.store();
        Self { coordinator, store }
    }

    pub fn template(&self, name: &str) -> TransactionTemplate {
        self.coordinator.template_named(name)
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    pub fn write(&self, ctx: &TransactionContext, name: &str) -> Result<RecordId> {
        self.store.write(ctx, Record::new("member", name))
    }

    /// Assert the chain finished with exactly one physical completion and
    /// left nothing behind
    pub fn assert_single_completion(&self, ctx: &TransactionContext) {
        let stats = self.stats();
        assert_eq!(stats.physical_completions(), 1, "stats: {:?}", stats);
        assert_eq!(stats.open_connections(), 0, "stats: {:?}", stats);
        assert!(!ctx.is_active());
        assert_eq!(ctx.depth(), 0);
    }
}
