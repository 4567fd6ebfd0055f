//! Quota accounting service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::QuotaError;
use super::types::{PlanLimitRecord, QuotaUsage};
use crate::plan::{Period, PlanPolicy, UserProfile};
use crate::store::StoreError;

/// Persistence for plan limit counters.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait PlanLimitStore: Send + Sync {
    /// Find the counter for a period.
    fn find(
        &self,
        user_id: Uuid,
        period: Period,
    ) -> impl std::future::Future<Output = Result<Option<PlanLimitRecord>, StoreError>> + Send;

    /// Add one to the counter for a period, creating it with a count of 1 if absent.
    ///
    /// Implementations must perform this as a single atomic step so concurrent
    /// calls never lose an increment. The `limit_reached` flag is left as is.
    fn increment(
        &self,
        user_id: Uuid,
        period: Period,
    ) -> impl std::future::Future<Output = Result<PlanLimitRecord, StoreError>> + Send;

    /// Raise the counter for a period to at least `count`, creating it if absent.
    ///
    /// Never lowers a counter. Atomic like [`Self::increment`].
    fn raise_count(
        &self,
        user_id: Uuid,
        period: Period,
        count: u32,
    ) -> impl std::future::Future<Output = Result<PlanLimitRecord, StoreError>> + Send;

    /// Set the `limit_reached` flag. A missing record is not an error.
    fn set_limit_reached(
        &self,
        user_id: Uuid,
        period: Period,
        reached: bool,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Quota accounting over a [`PlanLimitStore`].
pub struct QuotaService<Q: PlanLimitStore> {
    store: Arc<Q>,
    policy: PlanPolicy,
}

impl<Q: PlanLimitStore> Clone for QuotaService<Q> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
        }
    }
}

impl<Q: PlanLimitStore> QuotaService<Q> {
    /// Create a new quota service.
    #[must_use]
    pub const fn new(store: Arc<Q>, policy: PlanPolicy) -> Self {
        Self { store, policy }
    }

    /// Rules this service applies.
    #[must_use]
    pub const fn policy(&self) -> &PlanPolicy {
        &self.policy
    }

    /// Count one more transaction for `user_id` in `period`.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError` if the store rejects the increment.
    pub async fn record_transaction(
        &self,
        user_id: Uuid,
        period: Period,
    ) -> Result<PlanLimitRecord, QuotaError> {
        let record = self.store.increment(user_id, period).await?;

        debug!(
            user_id = %user_id,
            period = %period,
            count = record.transaction_count,
            "Transaction counted"
        );

        Ok(record)
    }

    /// Quota usage of a user for the period containing `now`.
    ///
    /// When a capped tier is at its limit and the stored flag is still false,
    /// the flag is set as a best-effort side effect.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Read` if the counter cannot be read.
    pub async fn usage(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<QuotaUsage, QuotaError> {
        let period = self.policy.period_at(now);
        let record = self.store.find(profile.id, period).await?;
        let count = record.as_ref().map_or(0, |r| r.transaction_count);

        let usage = QuotaUsage::compute(
            period,
            profile.effective_tier(now),
            count,
            self.policy.free_monthly_limit,
        );

        if usage.limit_reached && record.is_some_and(|r| !r.limit_reached) {
            if let Err(e) = self.store.set_limit_reached(profile.id, period, true).await {
                warn!(
                    user_id = %profile.id,
                    period = %period,
                    error = %e,
                    "Failed to mark plan limit as reached"
                );
            }
        }

        Ok(usage)
    }

    /// Bring the counter of a period up to `observed`, the number of
    /// transactions known to have been created in it.
    ///
    /// Increments lost to failed best-effort accounting are recovered here.
    /// Returns the counter value after reconciliation.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError` if the counter cannot be read or raised.
    pub async fn reconcile(
        &self,
        user_id: Uuid,
        period: Period,
        observed: u32,
    ) -> Result<u32, QuotaError> {
        let stored = self
            .store
            .find(user_id, period)
            .await?
            .map_or(0, |r| r.transaction_count);
        if observed <= stored {
            return Ok(stored);
        }

        let record = self.store.raise_count(user_id, period, observed).await?;
        warn!(
            user_id = %user_id,
            period = %period,
            stored,
            observed,
            "Quota counter was behind; raised to observed transactions"
        );
        Ok(record.transaction_count)
    }

    /// Clear the `limit_reached` flag of a period.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Write` if the store rejects the update.
    pub async fn clear_limit_flag(&self, user_id: Uuid, period: Period) -> Result<(), QuotaError> {
        self.store
            .set_limit_reached(user_id, period, false)
            .await
            .map_err(QuotaError::from)
    }
}
