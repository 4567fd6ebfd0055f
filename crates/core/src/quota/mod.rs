//! Per-user monthly transaction counters gating free-tier usage.

pub mod error;
pub mod service;
pub mod types;


pub use error::QuotaError;
pub use service::{PlanLimitStore, QuotaService};
pub use types::{PlanLimitRecord, QuotaUsage};
