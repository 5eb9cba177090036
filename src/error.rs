//! Error types for BreezeKV
//!
//! Provides a unified error type for all operations.
//!
//! The transaction error kinds carry a stable wire code
//! (`BREEZE-001`..`BREEZE-003`) that the network layer must preserve
//! verbatim for client compatibility.

use thiserror::Error;

/// Result type alias using BreezeError
pub type Result<T> = std::result::Result<T, BreezeError>;

/// Unified error type for BreezeKV operations
#[derive(Debug, Error)]
pub enum BreezeError {
    // -------------------------------------------------------------------------
    // Transaction Errors (caller errors, carry a wire code)
    // -------------------------------------------------------------------------
    #[error("transaction already exists: {0}")]
    TransactionAlreadyExists(String),

    #[error("unknown transaction: {0}")]
    UnknownTransaction(String),

    #[error("uncommittable transaction: {0}")]
    UncommittableTransaction(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BreezeError {
    /// The machine-readable code for transaction errors, `None` otherwise
    ///
    /// Codes are part of the wire contract and must not change.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            BreezeError::TransactionAlreadyExists(_) => Some("BREEZE-001"),
            BreezeError::UnknownTransaction(_) => Some("BREEZE-002"),
            BreezeError::UncommittableTransaction(_) => Some("BREEZE-003"),
            _ => None,
        }
    }

    /// Build the standard error for a transaction id that is not active
    pub fn unknown_transaction(txn_id: &str) -> Self {
        BreezeError::UnknownTransaction(format!(
            "there is no active transaction with the id [{}]",
            txn_id
        ))
    }
}
