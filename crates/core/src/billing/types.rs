//! Billing domain types.

use chrono::{DateTime, Utc};
use finora_shared::config::BillingConfig;
use serde::Serialize;
use uuid::Uuid;

/// Provider payment status of a paid checkout session.
pub const PAID: &str = "paid";

/// Provider status of a completed payment attempt.
pub const SUCCEEDED: &str = "succeeded";

/// A checkout session as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionInfo {
    /// Provider session ID.
    pub id: String,
    /// Correlation ID set at creation (`client_reference_id`).
    pub client_reference_id: Option<String>,
    /// `metadata.user_id` set at creation.
    pub metadata_user_id: Option<String>,
    /// Provider payment status (`paid`, `unpaid`, `no_payment_required`).
    pub payment_status: String,
}

impl CheckoutSessionInfo {
    /// User the session was created for: `client_reference_id`, falling back
    /// to `metadata.user_id`.
    #[must_use]
    pub fn correlation_id(&self) -> Option<&str> {
        self.client_reference_id
            .as_deref()
            .or(self.metadata_user_id.as_deref())
    }

    /// Returns true if the session belongs to `user_id` and has been paid.
    #[must_use]
    pub fn is_paid_by(&self, user_id: Uuid) -> bool {
        let owner_matches = self
            .correlation_id()
            .is_some_and(|id| id.eq_ignore_ascii_case(&user_id.to_string()));
        owner_matches && self.payment_status == PAID
    }
}

/// A payment attempt of a provider customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentInfo {
    /// Provider payment ID.
    pub id: String,
    /// Provider status.
    pub status: String,
    /// Amount in minor currency units.
    pub amount: i64,
    /// When the attempt was created.
    pub created: DateTime<Utc>,
}

impl PaymentIntentInfo {
    /// Returns true if this payment succeeded, covers `min_amount`, and is no
    /// older than `cutoff`.
    #[must_use]
    pub fn qualifies(&self, min_amount: i64, cutoff: DateTime<Utc>) -> bool {
        self.status == SUCCEEDED && self.amount >= min_amount && self.created >= cutoff
    }
}

/// Parameters of a hosted checkout page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// User the checkout is for, embedded for later correlation.
    pub user_id: Uuid,
    /// Email prefilled on the checkout page.
    pub customer_email: Option<String>,
    /// Price in minor currency units.
    pub amount: i64,
    /// Lowercase ISO 4217 code.
    pub currency: String,
    /// Product name shown to the payer.
    pub product_name: String,
    /// Redirect after payment.
    pub success_url: String,
    /// Redirect after abandonment.
    pub cancel_url: String,
}

/// A created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLink {
    /// Provider session ID.
    pub id: String,
    /// Hosted checkout page.
    pub url: String,
}

/// Checkout presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Lowercase ISO 4217 code.
    pub currency: String,
    /// Product name shown to the payer.
    pub product_name: String,
    /// Redirect after payment.
    pub success_url: String,
    /// Redirect after abandonment.
    pub cancel_url: String,
}

impl CheckoutSettings {
    /// Takes the checkout settings from the billing configuration.
    #[must_use]
    pub fn from_config(config: &BillingConfig) -> Self {
        Self {
            currency: config.currency.to_lowercase(),
            product_name: config.product_name.clone(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }
}

/// How a payment was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// A checkout session supplied by the caller.
    CheckoutSession,
    /// A recent succeeded payment found through the caller's email.
    RecentPayment,
}

/// Result of a successful payment verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Upgrade {
    /// End of the granted entitlement.
    pub subscription_end: DateTime<Utc>,
    /// How the payment was confirmed.
    pub method: VerificationMethod,
}
