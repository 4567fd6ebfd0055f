//! Premium upgrade: checkout creation and payment verification.
//!
//! The payment provider is reached through [`PaymentProvider`]; [`StripeClient`]
//! is the production implementation.

pub mod error;
pub mod provider;
pub mod service;
pub mod stripe;
pub mod types;


pub use error::{BillingError, ProviderError};
pub use provider::PaymentProvider;
pub use service::BillingService;
pub use stripe::StripeClient;
pub use types::{
    CheckoutLink, CheckoutRequest, CheckoutSessionInfo, CheckoutSettings, PaymentIntentInfo,
    Upgrade, VerificationMethod,
};
