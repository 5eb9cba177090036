//! Versioned value representation
//!
//! A key/value pair tagged with the logical time of its last write.

/// An immutable key/value pair stamped with a logical timestamp
///
/// A "changed" variant is always produced by copying with a new timestamp
/// (`with_time`), never by mutating in place. The timestamp is what commit
/// validation compares against a transaction's start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    key: String,
    value: String,
    timestamp: u64,
}

impl VersionedValue {
    /// Create a value stamped at the given logical time
    pub fn new(key: impl Into<String>, value: impl Into<String>, timestamp: u64) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            timestamp,
        }
    }

    /// The key this value belongs to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The stored value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Logical time of the last write
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Copy of this value carrying a new timestamp
    pub fn with_time(&self, timestamp: u64) -> Self {
        Self {
            key: self.key.clone(),
            value: self.value.clone(),
            timestamp,
        }
    }

    /// Whether this value was written after the given reference time
    ///
    /// Strict greater-than: a value written at exactly the reference time is
    /// not considered changed, so a transaction's own start time is a valid
    /// baseline snapshot.
    pub fn changed_since(&self, reference: u64) -> bool {
        self.timestamp > reference
    }
}
