//! Persistence error shared by every store trait.

use thiserror::Error;

/// Failure reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A read was rejected or failed.
    #[error("store read failed: {0}")]
    Read(String),

    /// A write was rejected or failed (constraint violation, connection loss, ...).
    #[error("store write failed: {0}")]
    Write(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
}
