//! Transaction context
//!
//! The buffer a named transaction accumulates its changes in.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::PendingChange;
use crate::store::VersionedValue;

/// A single transaction's identity, baseline, and pending changes
///
/// The context only buffers; it never reads or writes the committed store.
/// A key appears at most once in the buffer: the latest registered
/// operation for a key replaces any earlier one.
///
/// ## Concurrency
///
/// The buffer is guarded by its own mutex so concurrent callers writing
/// into the same transaction cannot corrupt it. That is internal
/// consistency only, not isolation between transactions. The mutex is a
/// leaf lock: no code path holding it acquires any other lock.
pub struct TransactionContext {
    /// Caller-supplied id, unique among active transactions
    id: String,

    /// Logical time captured at creation, the conflict-detection baseline
    start_time: u64,

    /// Pending operations keyed by the key they target
    changes: Mutex<HashMap<String, PendingChange>>,
}

impl TransactionContext {
    /// Create a context with its start time already read from the clock
    ///
    /// The engine passes the clock reading in; the context never consults
    /// an ambient time source.
    pub fn new(id: impl Into<String>, start_time: u64) -> Self {
        Self {
            id: id.into(),
            start_time,
            changes: Mutex::new(HashMap::new()),
        }
    }

    /// The id of this transaction
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the transaction started, in logical time
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Buffer an insert or update for the value's key
    pub fn register_upsert(&self, value: VersionedValue) {
        let mut changes = self.changes.lock();
        changes.insert(value.key().to_string(), PendingChange::Upsert(value));
    }

    /// Buffer a deletion for the key
    pub fn register_delete(&self, key: &str) {
        let mut changes = self.changes.lock();
        changes.insert(key.to_string(), PendingChange::Delete);
    }

    /// The buffered value for a key, if an upsert is pending
    ///
    /// A buffered delete and an untouched key both read as `None`; callers
    /// that need the committed state must go through the engine's direct
    /// read path.
    pub fn read(&self, key: &str) -> Option<String> {
        let changes = self.changes.lock();
        match changes.get(key) {
            Some(PendingChange::Upsert(value)) => Some(value.value().to_string()),
            Some(PendingChange::Delete) | None => None,
        }
    }

    /// Snapshot of the buffered operations, for the commit step
    pub fn changes(&self) -> HashMap<String, PendingChange> {
        self.changes.lock().clone()
    }

    /// Number of keys with a pending operation
    pub fn change_count(&self) -> usize {
        self.changes.lock().len()
    }
}
