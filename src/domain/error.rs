//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent rejected tree operations.
///
/// Every mutation reports failure through this type instead of panicking;
/// the reducer keeps the previous state when it sees one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("node is already first among its siblings: {0}")]
    AlreadyFirst(String),

    #[error("node is already a root: {0}")]
    AlreadyRoot(String),

    #[error("node cannot move {direction} past the sibling boundary: {id}")]
    AtBoundary { id: String, direction: String },

    #[error("cycle detected: {id} would become an ancestor of {new_parent}")]
    CycleDetected { id: String, new_parent: String },

    #[error("invalid rank for {id}: {rank}")]
    InvalidRank { id: String, rank: f64 },

    #[error("inline create session already open: {0}")]
    SessionAlreadyOpen(String),

    #[error("no inline create session is open")]
    NoOpenSession,

    #[error("inline create session mismatch: expected {expected}, got {actual}")]
    SessionMismatch { expected: String, actual: String },

    #[error("id already in use: {0}")]
    DuplicateId(String),

    #[error("placeholder cannot be anchored on itself: {0}")]
    InvalidAnchor(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
