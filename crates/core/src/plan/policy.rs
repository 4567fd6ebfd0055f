//! Business constants for tiers, quotas and subscriptions.

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use finora_shared::config::PlanConfig;
use thiserror::Error;

use super::types::Period;

/// Plan configuration errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The configured timezone is not a valid IANA name.
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A duration or amount is zero or negative.
    #[error("invalid plan setting {field}: {value}")]
    InvalidSetting {
        /// Setting name.
        field: &'static str,
        /// Rejected value.
        value: i64,
    },
}

/// Rules every workflow applies: free-tier cap, price, entitlement length,
/// payment look-back window, and the timezone that defines a quota month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPolicy {
    /// Transactions per month allowed on the free tier.
    pub free_monthly_limit: u32,
    /// Subscription price in minor currency units.
    pub subscription_price: i64,
    /// Length of one paid entitlement.
    pub subscription_duration: Duration,
    /// How old a succeeded payment may be and still count.
    pub payment_window: Duration,
    /// Timezone whose calendar defines quota periods.
    pub timezone: Tz,
}

impl Default for PlanPolicy {
    fn default() -> Self {
        Self {
            free_monthly_limit: 20,
            subscription_price: 1990,
            subscription_duration: Duration::days(30),
            payment_window: Duration::hours(24),
            timezone: chrono_tz::America::Sao_Paulo,
        }
    }
}

impl PlanPolicy {
    /// Builds the policy from configuration.
    ///
    /// # Errors
    ///
    /// Returns `PlanError` if the timezone is unknown or a setting is not positive.
    pub fn from_config(config: &PlanConfig) -> Result<Self, PlanError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| PlanError::InvalidTimezone(config.timezone.clone()))?;

        for (field, value) in [
            ("subscription_price", config.subscription_price),
            ("subscription_days", config.subscription_days),
            ("payment_window_hours", config.payment_window_hours),
        ] {
            if value <= 0 {
                return Err(PlanError::InvalidSetting { field, value });
            }
        }

        Ok(Self {
            free_monthly_limit: config.free_monthly_limit,
            subscription_price: config.subscription_price,
            subscription_duration: Duration::days(config.subscription_days),
            payment_window: Duration::hours(config.payment_window_hours),
            timezone,
        })
    }

    /// Returns the quota period that contains `now`.
    #[must_use]
    pub fn period_at(&self, now: DateTime<Utc>) -> Period {
        Period::containing(now, self.timezone)
    }

    /// Returns the end of an entitlement that starts at `now`.
    #[must_use]
    pub fn subscription_end_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + self.subscription_duration
    }

    /// Returns the oldest payment timestamp still accepted at `now`.
    #[must_use]
    pub fn payment_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.payment_window
    }
}
