//! Category errors.

use finora_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

/// Category workflow errors.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// No active session.
    #[error("authentication required")]
    Unauthenticated,

    /// Malformed name or type.
    #[error("{0}")]
    Validation(String),

    /// The user already has a category with this name and type.
    #[error("category already exists: {0}")]
    Duplicate(String),

    /// No category with this ID is visible to the caller.
    #[error("category not found: {0}")]
    NotFound(Uuid),

    /// The store failed.
    #[error("category store error: {0}")]
    Store(String),
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        match err {
            CategoryError::Unauthenticated => Self::Unauthorized(err.to_string()),
            CategoryError::Validation(msg) => Self::Validation(msg),
            CategoryError::Duplicate(_) => Self::Conflict(err.to_string()),
            CategoryError::NotFound(_) => Self::NotFound(err.to_string()),
            CategoryError::Store(_) => Self::Database(err.to_string()),
        }
    }
}
