//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Serve direct (auto-committed) put/get/delete against the committed map
//! - Manage the lifecycle of named transactions and their change buffers
//! - Validate and atomically apply transaction commits
//! - Keep direct operations linearizable with respect to commits

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{BreezeError, Result};
use crate::protocol::Command;
use crate::store::{LogicalClock, VersionedValue};
use crate::transaction::{PendingChange, TransactionContext};

/// The main storage engine
///
/// ## Concurrency Model: Reader/Writer store, independent transaction table
///
/// - **Committed store**: `RwLock`. Any number of `get` calls proceed
///   together; `put`, `delete`, and the validate+apply phase of a commit
///   take exclusive access and exclude all readers and writers.
/// - **Transaction table**: its own `Mutex`, so creating or rolling back
///   transactions never contends with direct reads of the store.
/// - **Per-transaction buffers**: each context carries a leaf mutex of its
///   own (see [`TransactionContext`]).
///
/// Lock order where both engine locks are needed (commit only):
/// transaction table first, then the store. No other operation acquires
/// both, so that is the only ordering constraint.
pub struct Engine {
    /// Committed key/value map; absence of a key means it does not exist
    store: RwLock<HashMap<String, VersionedValue>>,

    /// Active transactions by id
    transactions: Mutex<HashMap<String, Arc<TransactionContext>>>,

    /// Shared source of logical timestamps
    clock: LogicalClock,
}

impl Engine {
    /// Create an empty engine
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
            transactions: Mutex::new(HashMap::new()),
            clock: LogicalClock::new(),
        }
    }

    /// Execute a command
    ///
    /// Routes wire commands to the appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Option<String>> {
        match command {
            Command::Get { key } => self.get(&key),
            Command::Put { key, value } => {
                self.put(&key, &value)?;
                Ok(None)
            }
            Command::Delete { key } => {
                self.delete(&key)?;
                Ok(None)
            }
            Command::Ping => Ok(Some("PONG".to_string())),
            Command::TxnBegin { txn_id } => {
                self.create_transaction(&txn_id)?;
                Ok(None)
            }
            Command::TxnGet { txn_id, key } => self.get_in_transaction(&key, &txn_id),
            Command::TxnPut { txn_id, key, value } => {
                self.put_in_transaction(&key, &value, &txn_id)?;
                Ok(None)
            }
            Command::TxnDelete { txn_id, key } => {
                self.delete_in_transaction(&key, &txn_id)?;
                Ok(None)
            }
            Command::TxnCommit { txn_id } => {
                self.commit_transaction(&txn_id)?;
                Ok(None)
            }
            Command::TxnRollback { txn_id } => {
                self.rollback_transaction(&txn_id)?;
                Ok(None)
            }
        }
    }

    // =========================================================================
    // Direct Operations
    // =========================================================================

    /// Store a value under a key, visible immediately
    ///
    /// The write is stamped at the current logical time; any transaction
    /// created afterwards uses it as part of its baseline.
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut store = self.store.write();

        let entry = VersionedValue::new(key, value, self.clock.tick());
        tracing::debug!(
            "storing value for key [{}] with update time [{}]",
            key,
            entry.timestamp()
        );
        store.insert(key.to_string(), entry);

        Ok(())
    }

    /// The current committed value for a key, or `None`
    ///
    /// Absence is not an error; no side effects.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let store = self.store.read();

        let result = store.get(key).map(|entry| entry.value().to_string());
        tracing::trace!("read key [{}], found: {}", key, result.is_some());

        Ok(result)
    }

    /// Remove a key from the committed store entirely
    ///
    /// No tombstone or version record remains, so a transaction started
    /// before this delete will not see it as a conflict at commit time and
    /// can reinstate the key. Known limitation of history-discarding
    /// deletes; see DESIGN.md.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write();

        tracing::debug!("removing key [{}] from the store", key);
        store.remove(key);

        Ok(())
    }

    // =========================================================================
    // Transactional Operations
    // =========================================================================

    /// Buffer an insert/update inside an active transaction
    ///
    /// The per-call timestamp on the buffered value is never compared for
    /// conflicts; the commit step re-stamps it with the commit time.
    pub fn put_in_transaction(&self, key: &str, value: &str, txn_id: &str) -> Result<()> {
        let context = self.lookup_transaction(txn_id)?;

        let entry = VersionedValue::new(key, value, self.clock.tick());
        tracing::debug!("buffering value for key [{}] in transaction [{}]", key, txn_id);
        context.register_upsert(entry);

        Ok(())
    }

    /// The transaction's buffered value for a key, or `None`
    ///
    /// Reads only the transaction's own buffer: a buffered delete and a key
    /// the transaction has not touched both report `None`. There is no fall
    /// back to the committed store.
    pub fn get_in_transaction(&self, key: &str, txn_id: &str) -> Result<Option<String>> {
        let context = self.lookup_transaction(txn_id)?;

        let result = context.read(key);
        tracing::trace!(
            "read key [{}] from transaction [{}], found: {}",
            key,
            txn_id,
            result.is_some()
        );

        Ok(result)
    }

    /// Buffer a deletion inside an active transaction
    pub fn delete_in_transaction(&self, key: &str, txn_id: &str) -> Result<()> {
        let context = self.lookup_transaction(txn_id)?;

        tracing::debug!("buffering delete of key [{}] in transaction [{}]", key, txn_id);
        context.register_delete(key);

        Ok(())
    }

    // =========================================================================
    // Transaction Lifecycle
    // =========================================================================

    /// Register a new transaction under a caller-supplied id
    ///
    /// The id must not belong to an active transaction; it becomes reusable
    /// once that transaction commits or rolls back.
    pub fn create_transaction(&self, txn_id: &str) -> Result<()> {
        let mut transactions = self.transactions.lock();

        if transactions.contains_key(txn_id) {
            tracing::debug!("rejecting duplicate transaction id [{}]", txn_id);
            return Err(BreezeError::TransactionAlreadyExists(format!(
                "there is already an active transaction with the id [{}]",
                txn_id
            )));
        }

        let context = TransactionContext::new(txn_id, self.clock.tick());
        tracing::debug!(
            "created transaction [{}] at start time [{}]",
            txn_id,
            context.start_time()
        );
        transactions.insert(txn_id.to_string(), Arc::new(context));

        Ok(())
    }

    /// Discard a transaction without applying anything
    ///
    /// The removal itself is unconditional: a stale id is cleaned up either
    /// way, and only the error report differs.
    pub fn rollback_transaction(&self, txn_id: &str) -> Result<()> {
        let mut transactions = self.transactions.lock();

        match transactions.remove(txn_id) {
            Some(context) => {
                tracing::debug!(
                    "rolled back transaction [{}], discarding [{}] buffered changes",
                    txn_id,
                    context.change_count()
                );
                Ok(())
            }
            None => {
                tracing::debug!("rollback requested for unknown transaction [{}]", txn_id);
                Err(BreezeError::unknown_transaction(txn_id))
            }
        }
    }

    /// Validate and atomically apply a transaction
    ///
    /// Every commit attempt is terminal: the transaction leaves the active
    /// table whether validation passes or not, and the id is free for a new
    /// transaction afterwards.
    pub fn commit_transaction(&self, txn_id: &str) -> Result<()> {
        // Table lock held for the whole commit so no other lifecycle call
        // interleaves with lookup, validation, and removal.
        let mut transactions = self.transactions.lock();

        // Removing up front makes the failed-validation path terminal too.
        let context = match transactions.remove(txn_id) {
            Some(context) => context,
            None => {
                tracing::debug!("commit requested for unknown transaction [{}]", txn_id);
                return Err(BreezeError::unknown_transaction(txn_id));
            }
        };

        // Exclusive store access across validation and apply: no direct
        // write can slip in between the conflict check and the apply step.
        let mut store = self.store.write();

        let changes = context.changes();
        tracing::info!(
            "committing transaction [{}] with [{}] buffered changes",
            txn_id,
            changes.len()
        );

        // Validation pass: any touched key written after the transaction
        // started fails the whole commit. A missing key compares as
        // unchanged (see `delete`).
        for key in changes.keys() {
            let conflicted = store
                .get(key)
                .map_or(false, |current| current.changed_since(context.start_time()));
            if conflicted {
                tracing::debug!(
                    "conflict on key [{}]: modified after transaction [{}] started",
                    key,
                    txn_id
                );
                return Err(BreezeError::UncommittableTransaction(format!(
                    "the value for key [{}] has been modified after transaction [{}] \
                     started; the transaction is discarded, open a new one and retry",
                    key, txn_id
                )));
            }
        }

        // Apply pass: one commit timestamp for every buffered key, so the
        // transaction's effect is atomic for all subsequent readers.
        let commit_time = self.clock.tick();
        for (key, change) in changes {
            match change {
                PendingChange::Delete => {
                    store.remove(&key);
                }
                PendingChange::Upsert(value) => {
                    store.insert(key, value.with_time(commit_time));
                }
            }
        }

        Ok(())
    }

    /// Clone the context for an active transaction
    ///
    /// The table guard is released before the caller touches the context's
    /// buffer, keeping the buffer mutex a leaf lock.
    fn lookup_transaction(&self, txn_id: &str) -> Result<Arc<TransactionContext>> {
        let transactions = self.transactions.lock();
        transactions
            .get(txn_id)
            .cloned()
            .ok_or_else(|| BreezeError::unknown_transaction(txn_id))
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Number of keys in the committed store
    pub fn key_count(&self) -> usize {
        self.store.read().len()
    }

    /// Number of active transactions
    pub fn active_transaction_count(&self) -> usize {
        self.transactions.lock().len()
    }

    /// The logical timestamp of a key's current committed value
    pub fn version_of(&self, key: &str) -> Option<u64> {
        self.store.read().get(key).map(|entry| entry.timestamp())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
