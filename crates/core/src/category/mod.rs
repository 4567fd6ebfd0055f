//! Per-user category labels.

pub mod error;
pub mod service;
pub mod types;

pub use error::CategoryError;
pub use service::{CategoryService, CategoryStore};
pub use types::{Category, CategoryDraft, NewCategory};
