//! Coordinator configuration
//!
//! Configuration is plain TOML:
//!
//! ```toml
//! trigger_value = "trigger"
//! default_transaction_name = "txscope"
//! log_filter = "info"
//! ```
//!
//! Every key is optional; missing keys take the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;
use txscope_concurrency::{TransactionDefinition, DEFAULT_TRANSACTION_NAME};
use txscope_core::error::{Error, Result};
use txscope_storage::StoreOptions;

/// Trigger value used when none is configured
pub const DEFAULT_TRIGGER_VALUE: &str = "trigger";

/// Coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorConfig {
    /// Record content the store refuses with `RecordRejected`.
    /// An empty string disables rejection.
    pub trigger_value: String,
    /// Name given to scopes opened without an explicit name
    pub default_transaction_name: String,
    /// `tracing` filter directive used by the CLI when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            trigger_value: DEFAULT_TRIGGER_VALUE.to_string(),
            default_transaction_name: DEFAULT_TRANSACTION_NAME.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.default_transaction_name.trim().is_empty() {
            return Err(Error::Config(
                "default_transaction_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Store options derived from this configuration
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            trigger_value: Some(self.trigger_value.clone()).filter(|v| !v.is_empty()),
        }
    }

    /// Definition for scopes opened without an explicit name
    pub fn default_definition(&self) -> TransactionDefinition {
        TransactionDefinition::named(self.default_transaction_name.clone())
    }
}
