//! Core business logic for Finora.
//!
//! This crate contains the business rules with ZERO web or database dependencies.
//! Persistence and the payment provider are reached through traits that the
//! `db` crate and the Stripe client implement.
//!
//! # Modules
//!
//! - `plan` - Plan tiers, read-time expiry, quota periods and business constants
//! - `quota` - Per-user monthly transaction counters
//! - `transaction` - Transaction ingestion workflow
//! - `billing` - Checkout creation and payment verification workflow
//! - `category` - Per-user category labels
//! - `store` - Persistence error shared by every store trait

pub mod billing;
pub mod category;
pub mod plan;
pub mod quota;
pub mod store;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing;

pub use store::StoreError;
