//! Quota record and usage types.

use serde::Serialize;
use uuid::Uuid;

use crate::plan::{Period, PlanTier};

/// Stored transaction counter for one (user, month, year).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanLimitRecord {
    /// Owning user.
    pub user_id: Uuid,
    /// Quota period.
    pub period: Period,
    /// Transactions recorded in the period.
    pub transaction_count: u32,
    /// Persisted "limit reached" flag.
    pub limit_reached: bool,
}

/// Quota status of a user for one period, as readers see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaUsage {
    /// Calendar month.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Tier in force when the usage was computed.
    pub tier: PlanTier,
    /// Transactions recorded in the period.
    pub count: u32,
    /// Monthly cap, `None` when unlimited.
    pub limit: Option<u32>,
    /// True when a capped tier has used its whole allowance.
    pub limit_reached: bool,
    /// True when the tier has no cap.
    pub unlimited: bool,
    /// True when the presentation layer may accept another transaction.
    pub can_create: bool,
}

impl QuotaUsage {
    /// Computes usage from a count, the tier in force, and the free-tier cap.
    #[must_use]
    pub fn compute(period: Period, tier: PlanTier, count: u32, free_limit: u32) -> Self {
        if tier.is_unlimited() {
            return Self {
                month: period.month,
                year: period.year,
                tier,
                count,
                limit: None,
                limit_reached: false,
                unlimited: true,
                can_create: true,
            };
        }

        Self {
            month: period.month,
            year: period.year,
            tier,
            count,
            limit: Some(free_limit),
            limit_reached: count >= free_limit,
            unlimited: false,
            can_create: count < free_limit,
        }
    }

    /// Transactions left in the period, `None` when unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.count))
    }
}
