//! Payment provider seam.

use super::error::ProviderError;
use super::types::{CheckoutLink, CheckoutRequest, CheckoutSessionInfo, PaymentIntentInfo};

/// Operations the billing workflows need from a payment provider.
pub trait PaymentProvider: Send + Sync {
    /// Fetch a checkout session by ID.
    fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<CheckoutSessionInfo, ProviderError>> + Send;

    /// Find the first customer registered with `email`, returning its ID.
    fn find_customer_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, ProviderError>> + Send;

    /// List the most recent payment attempts of a customer, newest first.
    fn list_payment_intents(
        &self,
        customer_id: &str,
        limit: u8,
    ) -> impl std::future::Future<Output = Result<Vec<PaymentIntentInfo>, ProviderError>> + Send;

    /// Create a hosted checkout session.
    fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> impl std::future::Future<Output = Result<CheckoutLink, ProviderError>> + Send;
}

