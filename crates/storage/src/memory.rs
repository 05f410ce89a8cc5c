//! In-memory durable store
//!
//! `MemoryStore` is both the record store and the [`ConnectionSource`] the
//! transaction manager draws connections from.
//!
//! # Design
//!
//! - Committed records: `RwLock<FxHashMap>`, visible to every reader
//! - Open connections: `DashMap` keyed by connection id, each holding its
//!   commit mode and the writes staged on it
//! - Manual-commit writes stay staged until `physical_commit` moves them into
//!   the committed map; `physical_rollback` discards them
//! - Writes outside any transaction run in auto-commit mode on a private
//!   connection and are visible immediately
//!
//! # Thread Safety
//!
//! All operations are thread-safe. Different call chains hold different
//! connections, so their staged writes never interfere.

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use txscope_concurrency::TransactionContext;
use txscope_core::error::{Error, Result};
use txscope_core::{CommitMode, ConnectionHandle, ConnectionId, ConnectionSource, Record, RecordId};

/// Store options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Content that makes `write` fail with `RecordRejected`
    pub trigger_value: Option<String>,
}

impl StoreOptions {
    /// Options rejecting records whose name equals `value`
    pub fn with_trigger(value: impl Into<String>) -> Self {
        Self {
            trigger_value: Some(value.into()),
        }
    }
}

/// Snapshot of store activity counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Connections handed out (including auto-commit connections)
    pub connections_acquired: u64,
    /// Connections given back
    pub connections_released: u64,
    /// Physical commits of manual-commit connections
    pub physical_commits: u64,
    /// Physical rollbacks of manual-commit connections
    pub physical_rollbacks: u64,
    /// Writes committed in auto-commit mode
    pub auto_commits: u64,
    /// Writes refused by the trigger value
    pub rejected_writes: u64,
}

impl StoreStats {
    /// Physical commits plus physical rollbacks
    pub fn physical_completions(&self) -> u64 {
        self.physical_commits + self.physical_rollbacks
    }

    /// Connections currently handed out
    pub fn open_connections(&self) -> u64 {
        self.connections_acquired
            .saturating_sub(self.connections_released)
    }
}

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicU64,
    released: AtomicU64,
    commits: AtomicU64,
    rollbacks: AtomicU64,
    auto_commits: AtomicU64,
    rejected: AtomicU64,
}

/// Per-connection state kept by the store
#[derive(Debug, Default)]
struct ConnectionState {
    mode: CommitMode,
    staged: Vec<Record>,
}

/// Thread-safe in-memory record store with staged per-connection writes
#[derive(Debug)]
pub struct MemoryStore {
    committed: RwLock<FxHashMap<RecordId, Record>>,
    connections: DashMap<ConnectionId, ConnectionState>,
    next_connection: AtomicU64,
    next_record: AtomicU64,
    options: StoreOptions,
    counters: Counters,
}

impl MemoryStore {
    /// Create an empty store with default options (no trigger value)
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty store with the given options
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            committed: RwLock::new(FxHashMap::default()),
            connections: DashMap::new(),
            next_connection: AtomicU64::new(0),
            next_record: AtomicU64::new(0),
            options,
            counters: Counters::default(),
        }
    }

    /// Store options
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Write a record on the connection bound to `ctx`
    ///
    /// Inside a transaction the write is staged on the bound connection and
    /// becomes visible at physical commit. Outside any transaction the write
    /// commits immediately on a private auto-commit connection.
    ///
    /// # Errors
    /// - `RecordRejected` if the record's name equals the trigger value
    /// - `UnknownConnection` if the bound connection was not issued here
    pub fn write(&self, ctx: &TransactionContext, record: Record) -> Result<RecordId> {
        self.check_trigger(&record)?;

        match ctx.connection_id() {
            Some(connection) => self.write_on(connection, record),
            None => self.write_auto_commit(record),
        }
    }

    fn write_on(&self, connection: ConnectionId, record: Record) -> Result<RecordId> {
        let mut state = self
            .connections
            .get_mut(&connection)
            .ok_or(Error::UnknownConnection(connection))?;

        let id = self.allocate_record_id();
        let record = record.with_id(id);
        let mode = state.mode;
        match mode {
            CommitMode::Manual => {
                debug!(connection = %connection, record = %record, "Staged write");
                state.staged.push(record);
            }
            CommitMode::Auto => {
                drop(state);
                self.committed.write().insert(id, record);
                self.counters.auto_commits.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(id)
    }

    fn write_auto_commit(&self, record: Record) -> Result<RecordId> {
        let handle = self.acquire_connection()?;
        let result = self.write_on(handle.id(), record);
        self.release_connection(handle);
        result
    }

    fn check_trigger(&self, record: &Record) -> Result<()> {
        match &self.options.trigger_value {
            Some(trigger) if *trigger == record.name => {
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(collection = %record.collection, value = %record.name, "Record rejected by store");
                Err(Error::RecordRejected {
                    value: record.name.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Find the first record matching `predicate`
    ///
    /// Sees committed records plus the writes staged on `ctx`'s connection.
    /// Staged writes are searched first, then committed records in id order.
    pub fn find<P>(&self, ctx: &TransactionContext, predicate: P) -> Result<Option<Record>>
    where
        P: Fn(&Record) -> bool,
    {
        if let Some(connection) = ctx.connection_id() {
            let state = self
                .connections
                .get(&connection)
                .ok_or(Error::UnknownConnection(connection))?;
            if let Some(found) = state.staged.iter().find(|r| predicate(r)) {
                return Ok(Some(found.clone()));
            }
        }

        let committed = self.committed.read();
        Ok(committed
            .iter()
            .filter(|(_, r)| predicate(r))
            .min_by_key(|(id, _)| **id)
            .map(|(_, r)| r.clone()))
    }

    /// Find a record by collection and name
    pub fn find_by_name(
        &self,
        ctx: &TransactionContext,
        collection: &str,
        name: &str,
    ) -> Result<Option<Record>> {
        self.find(ctx, |r| r.matches(collection, name))
    }

    /// All committed records, ordered by id
    pub fn committed_records(&self) -> Vec<Record> {
        let mut records: Vec<Record> = self.committed.read().values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Whether a committed record with this collection and name exists
    pub fn contains(&self, collection: &str, name: &str) -> bool {
        self.committed
            .read()
            .values()
            .any(|r| r.matches(collection, name))
    }

    /// Number of committed records
    pub fn len(&self) -> usize {
        self.committed.read().len()
    }

    /// Whether no record is committed
    pub fn is_empty(&self) -> bool {
        self.committed.read().is_empty()
    }

    /// Snapshot of activity counters
    pub fn stats(&self) -> StoreStats {
        // released first: a release never precedes its acquire
        let connections_released = self.counters.released.load(Ordering::SeqCst);
        StoreStats {
            connections_acquired: self.counters.acquired.load(Ordering::SeqCst),
            connections_released,
            physical_commits: self.counters.commits.load(Ordering::SeqCst),
            physical_rollbacks: self.counters.rollbacks.load(Ordering::SeqCst),
            auto_commits: self.counters.auto_commits.load(Ordering::SeqCst),
            rejected_writes: self.counters.rejected.load(Ordering::SeqCst),
        }
    }

    fn allocate_record_id(&self) -> RecordId {
        RecordId::new(self.next_record.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn check_open(&self, handle: &ConnectionHandle) -> Result<()> {
        if !handle.is_open() {
            return Err(Error::ConnectionClosed(handle.id()));
        }
        if !self.connections.contains_key(&handle.id()) {
            return Err(Error::UnknownConnection(handle.id()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionSource for MemoryStore {
    fn acquire_connection(&self) -> Result<ConnectionHandle> {
        let id = ConnectionId::new(self.next_connection.fetch_add(1, Ordering::SeqCst) + 1);
        self.connections.insert(id, ConnectionState::default());
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        debug!(connection = %id, "Acquired connection");
        Ok(ConnectionHandle::new(id))
    }

    fn set_manual_commit(&self, handle: &mut ConnectionHandle) -> Result<()> {
        self.check_open(handle)?;
        if let Some(mut state) = self.connections.get_mut(&handle.id()) {
            state.mode = CommitMode::Manual;
        }
        handle.set_commit_mode(CommitMode::Manual);
        Ok(())
    }

    fn physical_commit(&self, handle: &mut ConnectionHandle) -> Result<()> {
        self.check_open(handle)?;
        let staged = match self.connections.get_mut(&handle.id()) {
            Some(mut state) => std::mem::take(&mut state.staged),
            None => return Err(Error::UnknownConnection(handle.id())),
        };

        let count = staged.len();
        {
            let mut committed = self.committed.write();
            for record in staged {
                if let Some(id) = record.id {
                    committed.insert(id, record);
                }
            }
        }
        self.counters.commits.fetch_add(1, Ordering::SeqCst);
        debug!(connection = %handle.id(), records = count, "Physical commit");
        Ok(())
    }

    fn physical_rollback(&self, handle: &mut ConnectionHandle) -> Result<()> {
        self.check_open(handle)?;
        let discarded = match self.connections.get_mut(&handle.id()) {
            Some(mut state) => std::mem::take(&mut state.staged).len(),
            None => return Err(Error::UnknownConnection(handle.id())),
        };
        self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        debug!(connection = %handle.id(), discarded, "Physical rollback");
        Ok(())
    }

    fn release_connection(&self, mut handle: ConnectionHandle) {
        handle.close();
        let Some((id, state)) = self.connections.remove(&handle.id()) else {
            debug!(connection = %handle.id(), "Ignoring release of unknown connection");
            return;
        };
        if !state.staged.is_empty() {
            warn!(
                connection = %id,
                discarded = state.staged.len(),
                "Connection released with staged writes; discarding them"
            );
        }
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}
