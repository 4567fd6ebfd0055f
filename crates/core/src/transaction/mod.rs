//! Transaction ingestion workflow.
//!
//! Validates a proposed transaction, persists it under the caller's identity and
//! counts it against the caller's monthly quota as a best-effort side effect.

pub mod error;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::TransactionError;
pub use service::{TransactionService, TransactionStore};
pub use types::{
    AmountInput, NewTransaction, Transaction, TransactionDraft, TransactionFilter, TransactionKind,
};
