//! # BreezeKV
//!
//! An in-memory key-value store with:
//! - Single-key atomic operations (auto-committed)
//! - Named multi-key transactions with optimistic concurrency control
//! - Write-write conflict detection at commit time
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Engine                                  │
//! │        (Committed Store + Transaction Table)                 │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!     ┌─────────────┐               ┌───────────────┐
//!     │  Committed  │               │  Transaction  │
//!     │    Store    │               │    Buffers    │
//!     │  (RwLock)   │◄── commit ────│   (Mutex)     │
//!     └─────────────┘               └───────────────┘
//! ```
//!
//! Direct operations hit the committed store under a reader/writer lock.
//! Transactional operations buffer into a per-transaction context; a commit
//! validates every buffered key against the store's current versions and,
//! only if nothing conflicts, applies all changes under one timestamp.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod transaction;
pub mod engine;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{BreezeError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of BreezeKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
