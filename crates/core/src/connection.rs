//! Connection handle abstraction
//!
//! A [`ConnectionHandle`] is the opaque token for one physical session with
//! a store. Handles are created and mutated only by a [`ConnectionSource`];
//! the transaction manager owns the handle while a physical transaction is
//! active and gives it back on release.

use crate::error::Result;
use crate::types::{CommitMode, ConnectionId};

/// One physical connection to a store
#[derive(Debug, PartialEq, Eq)]
pub struct ConnectionHandle {
    id: ConnectionId,
    mode: CommitMode,
    open: bool,
}

impl ConnectionHandle {
    /// Create an open handle in auto-commit mode
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            mode: CommitMode::Auto,
            open: true,
        }
    }

    /// Connection identity
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Current commit mode
    pub fn commit_mode(&self) -> CommitMode {
        self.mode
    }

    /// Whether the handle has not been released yet
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Change the commit mode. Only connection sources call this.
    pub fn set_commit_mode(&mut self, mode: CommitMode) {
        self.mode = mode;
    }

    /// Mark the handle closed. Only connection sources call this.
    pub fn close(&mut self) {
        self.open = false;
    }
}

/// Supplier of physical connections and the physical transaction primitives
///
/// Implementations must be usable from several call chains at once; each
/// chain holds its own handle.
pub trait ConnectionSource: Send + Sync {
    /// Open a new physical connection in auto-commit mode
    fn acquire_connection(&self) -> Result<ConnectionHandle>;

    /// Switch the connection to manual-commit (transactional) mode
    fn set_manual_commit(&self, handle: &mut ConnectionHandle) -> Result<()>;

    /// Make every write staged on the connection durable and visible
    fn physical_commit(&self, handle: &mut ConnectionHandle) -> Result<()>;

    /// Discard every write staged on the connection
    fn physical_rollback(&self, handle: &mut ConnectionHandle) -> Result<()>;

    /// Return the connection to the source; the handle is unusable afterwards
    fn release_connection(&self, handle: ConnectionHandle);
}
