//! Plan tiers, subscription expiry, and quota periods.

pub mod policy;
pub mod profile;
pub mod types;

pub use policy::{PlanError, PlanPolicy};
pub use profile::{ProfileStore, UserProfile};
pub use types::{Period, PlanTier};
