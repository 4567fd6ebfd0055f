//! User profile and read-time plan expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::PlanTier;
use crate::store::StoreError;

/// A user's profile: the single source of truth for plan tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User ID (same as the auth provider's subject).
    pub id: Uuid,
    /// Display name.
    pub name: Option<String>,
    /// Stored plan tier.
    pub plan: PlanTier,
    /// End of the paid entitlement, if any.
    pub subscription_end: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Profile assumed for a user whose row does not exist yet.
    #[must_use]
    pub const fn free(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            plan: PlanTier::Free,
            subscription_end: None,
        }
    }

    /// Tier in force at `now`.
    ///
    /// Expiry is computed here rather than stored: a premium profile whose
    /// `subscription_end` is missing or not after `now` reads as free, even though
    /// the stored `plan` still says premium. Master is granted manually and does
    /// not expire.
    #[must_use]
    pub fn effective_tier(&self, now: DateTime<Utc>) -> PlanTier {
        match self.plan {
            PlanTier::Premium if self.subscription_end.is_some_and(|end| end > now) => {
                PlanTier::Premium
            }
            PlanTier::Premium | PlanTier::Free => PlanTier::Free,
            PlanTier::Master => PlanTier::Master,
        }
    }

    /// Returns true if a non-free tier is in force at `now`.
    #[must_use]
    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.effective_tier(now) != PlanTier::Free
    }
}

/// Persistence for user profiles.
pub trait ProfileStore: Send + Sync {
    /// Find the profile of a user.
    fn find(
        &self,
        user_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, StoreError>> + Send;

    /// Set plan and subscription end, creating the profile row if it is missing.
    fn set_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        subscription_end: Option<DateTime<Utc>>,
    ) -> impl std::future::Future<Output = Result<UserProfile, StoreError>> + Send;
}
