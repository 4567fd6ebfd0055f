//! Quota accounting errors.

use thiserror::Error;

use crate::store::StoreError;

/// Quota accounting errors.
///
/// Raised by the store-facing operations; the ingestion and payment workflows
/// log these and carry on.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// The counter could not be read.
    #[error("failed to read plan limit record: {0}")]
    Read(String),

    /// The counter could not be written.
    #[error("failed to write plan limit record: {0}")]
    Write(String),
}

impl From<StoreError> for QuotaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Read(msg) => Self::Read(msg),
            StoreError::Write(msg) | StoreError::Conflict(msg) => Self::Write(msg),
        }
    }
}
