//! Entity re-exports.

pub use super::categories::Entity as Categories;
pub use super::plan_limits::Entity as PlanLimits;
pub use super::profiles::Entity as Profiles;
pub use super::transactions::Entity as Transactions;
