//! Transaction Module
//!
//! Per-transaction change buffering for optimistic concurrency control.
//!
//! ## Responsibilities
//! - Buffer a transaction's pending upserts and deletes until commit
//! - Remember the transaction's start time (the conflict-detection baseline)
//! - Keep one transaction's buffer internally consistent under concurrent
//!   callers
//!
//! Buffered changes never touch the committed store; the
//! [`Engine`](crate::engine::Engine) applies them atomically at commit time.

mod context;

pub use context::TransactionContext;

use crate::store::VersionedValue;

/// A pending operation buffered inside a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum PendingChange {
    /// An insert or update waiting to be applied
    Upsert(VersionedValue),

    /// A deletion marker for the key
    Delete,
}
