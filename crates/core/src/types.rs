//! Core types for the transaction coordinator
//!
//! This module defines the fundamental identifiers and payloads used
//! throughout the system:
//! - [`ContextId`]: Identity of one call chain's transaction context
//! - [`ConnectionId`]: Identity of a physical connection
//! - [`RecordId`]: Store-allocated record identifier
//! - [`Record`]: The payload written to and read from the durable store

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a transaction context (one call chain)
///
/// Every status handed out by the manager remembers the context it was
/// created in, so a status can never be completed against another chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Create a new random ContextId using UUID v4
    ///
    /// # Examples
    ///
    /// ```
    /// use txscope_core::types::ContextId;
    ///
    /// let id1 = ContextId::new();
    /// let id2 = ContextId::new();
    /// assert_ne!(id1, id2);
    /// ```
    pub fn new() -> Self {
        ContextId(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one physical connection handed out by a connection source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw connection number
    pub fn new(id: u64) -> Self {
        ConnectionId(id)
    }

    /// Get the raw value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn:{}", self.0)
    }
}

/// Store-allocated record identifier
///
/// Identifiers are allocated at write time, so ids of rolled-back writes
/// are never reused and gaps are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(u64);

impl RecordId {
    /// Wrap a raw record number
    pub fn new(id: u64) -> Self {
        RecordId(id)
    }

    /// Get the raw value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commit mode of a connection
///
/// A freshly acquired connection is in `Auto` mode: every write is its own
/// unit of work. The transaction manager switches it to `Manual` when a
/// physical transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitMode {
    /// Every write commits immediately
    #[default]
    Auto,
    /// Writes are staged until an explicit physical commit or rollback
    Manual,
}

/// A record written to the durable store
///
/// # Examples
///
/// ```
/// use txscope_core::types::Record;
///
/// let member = Record::new("member", "x1");
/// assert_eq!(member.collection, "member");
/// assert_eq!(member.name, "x1");
/// assert!(member.id.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, assigned by the store on write
    pub id: Option<RecordId>,
    /// Logical collection the record belongs to (e.g. "member", "log")
    pub collection: String,
    /// Content field; compared against the store's trigger value
    pub name: String,
}

impl Record {
    /// Create an unsaved record
    pub fn new(collection: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: None,
            collection: collection.into(),
            name: name.into(),
        }
    }

    /// Return a copy of this record carrying the given id
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether this record belongs to `collection` and has content `name`
    pub fn matches(&self, collection: &str, name: &str) -> bool {
        self.collection == collection && self.name == name
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "{}{}:{}", self.collection, id, self.name),
            None => write!(f, "{}(unsaved):{}", self.collection, self.name),
        }
    }
}
