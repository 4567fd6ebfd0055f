//! Billing errors.

use finora_shared::AppError;
use thiserror::Error;

/// Failures talking to the payment provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never got a response.
    #[error("payment provider unreachable: {0}")]
    Transport(String),

    /// The provider answered with an error status.
    #[error("payment provider returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("unexpected payment provider response: {0}")]
    Decode(String),

    /// The request was rejected before being sent.
    #[error("invalid payment provider request: {0}")]
    InvalidRequest(String),
}

/// Errors surfaced by the checkout and payment verification workflows.
#[derive(Debug, Error)]
pub enum BillingError {
    /// No active session.
    #[error("authentication required")]
    Unauthenticated,

    /// The checkout session is unpaid or belongs to someone else.
    #[error("payment not verified")]
    PaymentNotVerified,

    /// The provider has no customer with the caller's email.
    #[error("no customer found for this account")]
    NoCustomerFound,

    /// The customer has no qualifying payment in the look-back window.
    #[error("no recent payment found")]
    NoRecentPayment,

    /// Payment was confirmed but the profile could not be upgraded.
    #[error("failed to update profile: {0}")]
    ProfileUpdate(String),

    /// The payment provider could not be used.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::Unauthenticated => Self::Unauthorized(err.to_string()),
            BillingError::ProfileUpdate(_) => Self::Database(err.to_string()),
            BillingError::PaymentNotVerified
            | BillingError::NoCustomerFound
            | BillingError::NoRecentPayment
            | BillingError::Provider(_) => Self::ExternalService(err.to_string()),
        }
    }
}
