//! Checkout creation and payment verification workflows.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use finora_shared::Identity;
use tracing::{info, warn};

use super::error::{BillingError, ProviderError};
use super::provider::PaymentProvider;
use super::types::{CheckoutLink, CheckoutRequest, CheckoutSettings, Upgrade, VerificationMethod};
use crate::plan::{PlanTier, ProfileStore};
use crate::quota::{PlanLimitStore, QuotaService};

/// How many recent payment attempts the fallback path inspects.
const RECENT_PAYMENTS_LIMIT: u8 = 10;

/// Billing workflows over a payment provider, the profile store and the quota store.
pub struct BillingService<P: PaymentProvider, S: ProfileStore, Q: PlanLimitStore> {
    provider: Arc<P>,
    profiles: Arc<S>,
    quota: QuotaService<Q>,
    checkout: CheckoutSettings,
}

impl<P: PaymentProvider, S: ProfileStore, Q: PlanLimitStore> BillingService<P, S, Q> {
    /// Create a new billing service.
    #[must_use]
    pub const fn new(
        provider: Arc<P>,
        profiles: Arc<S>,
        quota: QuotaService<Q>,
        checkout: CheckoutSettings,
    ) -> Self {
        Self {
            provider,
            profiles,
            quota,
            checkout,
        }
    }

    /// Create a hosted checkout page for the caller.
    ///
    /// The caller's user ID is embedded as both the client reference and
    /// `metadata.user_id` so the session can be correlated on verification.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the identity is no longer active
    /// - `Provider` if the provider rejects the request
    pub async fn create_checkout(&self, identity: &Identity) -> Result<CheckoutLink, BillingError> {
        if !identity.is_active_at(Utc::now()) {
            return Err(BillingError::Unauthenticated);
        }

        let request = CheckoutRequest {
            user_id: identity.user_id,
            customer_email: identity.email.clone(),
            amount: self.quota.policy().subscription_price,
            currency: self.checkout.currency.clone(),
            product_name: self.checkout.product_name.clone(),
            success_url: self.checkout.success_url.clone(),
            cancel_url: self.checkout.cancel_url.clone(),
        };

        let link = self.provider.create_checkout_session(&request).await?;

        info!(
            user_id = %identity.user_id,
            session_id = %link.id,
            "Checkout session created"
        );

        Ok(link)
    }

    /// Verify a payment and upgrade the caller to premium.
    ///
    /// # Errors
    ///
    /// See [`Self::verify_payment_at`].
    pub async fn verify_payment(
        &self,
        identity: &Identity,
        session_id: Option<&str>,
    ) -> Result<Upgrade, BillingError> {
        self.verify_payment_at(identity, session_id, Utc::now()).await
    }

    /// Verify a payment as of `now` and upgrade the caller to premium.
    ///
    /// With a session ID, that checkout session must belong to the caller and be
    /// paid. Without one, the caller's provider customer (found by email) must
    /// have a succeeded payment of at least the subscription price inside the
    /// payment window. On success the entitlement runs from `now` for the
    /// subscription duration; verifying again resets it from the new `now`.
    ///
    /// Clearing the current period's limit flag afterwards is best-effort.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the identity is not active at `now`
    /// - `PaymentNotVerified` if the session is unpaid or not the caller's
    /// - `NoCustomerFound` if no provider customer matches the caller's email
    /// - `NoRecentPayment` if no payment qualifies
    /// - `ProfileUpdate` if the upgrade cannot be written
    /// - `Provider` if the provider cannot be used
    pub async fn verify_payment_at(
        &self,
        identity: &Identity,
        session_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Upgrade, BillingError> {
        if !identity.is_active_at(now) {
            return Err(BillingError::Unauthenticated);
        }

        let method = match session_id.map(str::trim).filter(|id| !id.is_empty()) {
            Some(session_id) => self.verify_session(identity, session_id).await?,
            None => self.verify_recent_payment(identity, now).await?,
        };

        let policy = self.quota.policy();
        let subscription_end = policy.subscription_end_from(now);

        self.profiles
            .set_plan(identity.user_id, PlanTier::Premium, Some(subscription_end))
            .await
            .map_err(|e| BillingError::ProfileUpdate(e.to_string()))?;

        info!(
            user_id = %identity.user_id,
            subscription_end = %subscription_end,
            method = ?method,
            "User upgraded to premium"
        );

        let period = policy.period_at(now);
        if let Err(e) = self.quota.clear_limit_flag(identity.user_id, period).await {
            warn!(
                user_id = %identity.user_id,
                period = %period,
                error = %e,
                "Failed to clear plan limit flag after upgrade"
            );
        }

        Ok(Upgrade {
            subscription_end,
            method,
        })
    }

    async fn verify_session(
        &self,
        identity: &Identity,
        session_id: &str,
    ) -> Result<VerificationMethod, BillingError> {
        let session = match self.provider.retrieve_checkout_session(session_id).await {
            Ok(session) => session,
            Err(
                ProviderError::Api {
                    status: 404,
                    message,
                }
                | ProviderError::InvalidRequest(message),
            ) => {
                warn!(
                    user_id = %identity.user_id,
                    session_id = %session_id,
                    error = %message,
                    "Checkout session not found"
                );
                return Err(BillingError::PaymentNotVerified);
            }
            Err(e) => return Err(e.into()),
        };

        if !session.is_paid_by(identity.user_id) {
            warn!(
                user_id = %identity.user_id,
                session_id = %session.id,
                payment_status = %session.payment_status,
                "Checkout session not paid by caller"
            );
            return Err(BillingError::PaymentNotVerified);
        }

        Ok(VerificationMethod::CheckoutSession)
    }

    async fn verify_recent_payment(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<VerificationMethod, BillingError> {
        let Some(email) = identity.email.as_deref() else {
            return Err(BillingError::NoCustomerFound);
        };

        let customer_id = self
            .provider
            .find_customer_by_email(email)
            .await?
            .ok_or(BillingError::NoCustomerFound)?;

        let payments = self
            .provider
            .list_payment_intents(&customer_id, RECENT_PAYMENTS_LIMIT)
            .await?;

        let policy = self.quota.policy();
        let cutoff = policy.payment_cutoff(now);
        let found = payments
            .iter()
            .any(|p| p.qualifies(policy.subscription_price, cutoff));

        if !found {
            warn!(
                user_id = %identity.user_id,
                inspected = payments.len(),
                "No qualifying recent payment"
            );
            return Err(BillingError::NoRecentPayment);
        }

        Ok(VerificationMethod::RecentPayment)
    }
}
