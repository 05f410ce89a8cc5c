//! Main entry point for txscope.
//!
//! This module provides the `Coordinator` struct, which wires a store, a
//! transaction manager and scope templates together.

use std::sync::Arc;
use txscope_concurrency::{TransactionContext, TransactionManager};
use txscope_core::Result;
use txscope_engine::{CoordinatorConfig, MemberService, TransactionTemplate};
use txscope_storage::{MemoryStore, StoreStats};

/// A store plus the transaction machinery bound to it.
///
/// # Example
///
/// ```
/// use txscope::prelude::*;
///
/// let coordinator = Coordinator::new();
/// let store = coordinator.store();
/// let mut ctx = coordinator.context();
///
/// coordinator
///     .template()
///     .execute(&mut ctx, |ctx| store.write(ctx, Record::new("member", "x1")))
///     .unwrap();
///
/// assert!(store.contains("member", "x1"));
/// ```
#[derive(Debug, Clone)]
pub struct Coordinator {
    store: Arc<MemoryStore>,
    manager: TransactionManager,
    template: TransactionTemplate,
    config: CoordinatorConfig,
}

impl Coordinator {
    /// Coordinator over a fresh store with default configuration.
    pub fn new() -> Self {
        Self::from_config(CoordinatorConfig::default())
    }

    /// Coordinator over a fresh store configured by `config`.
    pub fn from_config(config: CoordinatorConfig) -> Self {
        let store = Arc::new(MemoryStore::with_options(config.store_options()));
        let manager = TransactionManager::new(store.clone());
        let template = TransactionTemplate::with_definition(manager.clone(), config.default_definition());
        tracing::debug!(
            trigger = %config.trigger_value,
            name = %config.default_transaction_name,
            "Coordinator created"
        );
        Self {
            store,
            manager,
            template,
            config,
        }
    }

    /// Coordinator configured from a TOML file.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Ok(Self::from_config(CoordinatorConfig::from_file(path)?))
    }

    /// Create a builder for coordinator configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use txscope::Coordinator;
    ///
    /// let coordinator = Coordinator::builder()
    ///     .trigger_value("explode")
    ///     .transaction_name("signup")
    ///     .build();
    /// assert_eq!(coordinator.config().trigger_value, "explode");
    /// ```
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// Fresh, empty context for a new call chain.
    pub fn context(&self) -> TransactionContext {
        TransactionContext::new()
    }

    /// The underlying store.
    pub fn store(&self) -> Arc<MemoryStore> {
        self.store.clone()
    }

    /// The transaction manager.
    pub fn manager(&self) -> &TransactionManager {
        &self.manager
    }

    /// Scope wrapper using the configured default transaction name.
    pub fn template(&self) -> TransactionTemplate {
        self.template.clone()
    }

    /// Scope wrapper using `name` for the scopes it opens.
    pub fn template_named(&self, name: impl Into<String>) -> TransactionTemplate {
        self.template.named(name)
    }

    /// Member sign-up service over this coordinator's store.
    pub fn member_service(&self) -> MemberService {
        MemberService::new(self.store.clone(), &self.template)
    }

    /// Store activity counters.
    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Active configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for coordinator configuration.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
}

impl CoordinatorBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Make the store reject records whose name equals `value`.
    pub fn trigger_value(mut self, value: impl Into<String>) -> Self {
        self.config.trigger_value = value.into();
        self
    }

    /// Disable record rejection.
    pub fn no_trigger(mut self) -> Self {
        self.config.trigger_value.clear();
        self
    }

    /// Default name for scopes opened by [`Coordinator::template`].
    pub fn transaction_name(mut self, name: impl Into<String>) -> Self {
        self.config.default_transaction_name = name.into();
        self
    }

    /// Build the coordinator.
    pub fn build(self) -> Coordinator {
        Coordinator::from_config(self.config)
    }
}
