//! Aggregate root trait and optimistic concurrency expectations.

use crate::error::{DomainError, DomainResult};

/// Aggregate root marker + minimal interface.
///
/// Domain crates decide how they model state transitions; storage only sees
/// identity and a monotonically increasing version for conditional writes.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the aggregate identifier.
    fn id(&self) -> &Self::Id;

    /// Monotonically increasing version of the aggregate's state.
    ///
    /// A freshly persisted aggregate is at version 1; every accepted state
    /// transition adds one.
    fn version(&self) -> u64;
}

/// Optimistic concurrency check: the stored aggregate must still be at the
/// version the caller loaded.
pub fn check_version(expected: u64, actual: u64) -> DomainResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(DomainError::conflict(format!(
            "optimistic concurrency check failed (expected: {expected}, actual: {actual})"
        )))
    }
}
