//! Transaction workflow errors.

use finora_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the transaction workflow.
///
/// Quota accounting failures never appear here; they are logged and dropped.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// No active session.
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed date, value, type or label.
    #[error("{0}")]
    Validation(String),

    /// The store rejected the write.
    #[error("failed to store transaction: {0}")]
    StoreWrite(String),

    /// The store could not be read.
    #[error("failed to read transactions: {0}")]
    StoreRead(String),

    /// No transaction with this ID is visible to the caller.
    #[error("transaction not found: {0}")]
    NotFound(Uuid),
}

impl From<TransactionError> for AppError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Unauthenticated => Self::Unauthorized(err.to_string()),
            TransactionError::Validation(msg) => Self::Validation(msg),
            TransactionError::StoreWrite(_) | TransactionError::StoreRead(_) => {
                Self::Database(err.to_string())
            }
            TransactionError::NotFound(_) => Self::NotFound(err.to_string()),
        }
    }
}
