//! Domain error model.

use thiserror::Error;

/// Result type used by the shared domain primitives.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error for the building blocks in this crate.
///
/// Business-rule failures of a concrete entity live in that entity's crate;
/// this only covers identifiers and version conflicts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A conflict occurred (stale version / optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
