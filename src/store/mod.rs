//! Store Module
//!
//! The in-memory data layer: versioned values and the logical clock that
//! stamps them.
//!
//! ## Responsibilities
//! - Represent each committed value together with its last-write time
//! - Issue strictly increasing logical timestamps for writes, transaction
//!   starts, and commits from one shared counter
//!
//! The committed map itself is owned by the [`Engine`](crate::engine::Engine);
//! this module only provides the value and time types it stores.

mod clock;
mod value;

pub use clock::LogicalClock;
pub use value::VersionedValue;
