//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Payment provider configuration.
    pub billing: BillingConfig,
    /// Plan and quota rules.
    #[serde(default)]
    pub plan: PlanConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
///
/// Tokens are issued by the auth provider; this service only validates them,
/// so `secret` must be the provider's signing secret.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key used to verify token signatures.
    pub secret: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Lifetime of tokens minted by this service (tooling and tests only).
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            audience: default_audience(),
            access_token_expiry_secs: default_access_token_expiry(),
        }
    }
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Payment provider (Stripe) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Secret API key.
    pub stripe_secret_key: String,
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// ISO 4217 currency code, lowercase as the provider expects it.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Product name shown on the hosted checkout page.
    #[serde(default = "default_product_name")]
    pub product_name: String,
    /// Redirect target after a completed checkout.
    #[serde(default = "default_success_url")]
    pub success_url: String,
    /// Redirect target after an abandoned checkout.
    #[serde(default = "default_cancel_url")]
    pub cancel_url: String,
    /// Per-request timeout for provider calls.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "brl".to_string()
}

fn default_product_name() -> String {
    "Plano Premium".to_string()
}

fn default_success_url() -> String {
    "http://localhost:5173/upgrade/success?session_id={CHECKOUT_SESSION_ID}".to_string()
}

fn default_cancel_url() -> String {
    "http://localhost:5173/upgrade".to_string()
}

fn default_request_timeout() -> u64 {
    20
}

/// Plan tiers, quota and subscription rules.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanConfig {
    /// Transactions per month allowed on the free tier.
    #[serde(default = "default_free_monthly_limit")]
    pub free_monthly_limit: u32,
    /// Subscription price in minor currency units.
    #[serde(default = "default_subscription_price")]
    pub subscription_price: i64,
    /// Length of one paid entitlement.
    #[serde(default = "default_subscription_days")]
    pub subscription_days: i64,
    /// How far back a payment may be and still upgrade the user.
    #[serde(default = "default_payment_window_hours")]
    pub payment_window_hours: i64,
    /// IANA timezone that defines the calendar month of a quota period.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            free_monthly_limit: default_free_monthly_limit(),
            subscription_price: default_subscription_price(),
            subscription_days: default_subscription_days(),
            payment_window_hours: default_payment_window_hours(),
            timezone: default_timezone(),
        }
    }
}

fn default_free_monthly_limit() -> u32 {
    20
}

fn default_subscription_price() -> i64 {
    1990 // R$19.90
}

fn default_subscription_days() -> i64 {
    30
}

fn default_payment_window_hours() -> i64 {
    24
}

fn default_timezone() -> String {
    "America/Sao_Paulo".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FINORA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
