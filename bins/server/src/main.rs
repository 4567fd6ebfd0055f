//! Finora API Server
//!
//! Main entry point for the Finora backend service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use finora_api::{AppState, create_router};
use finora_core::billing::{CheckoutSettings, StripeClient};
use finora_core::plan::PlanPolicy;
use finora_db::connect;
use finora_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "finora=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect(&config.database).await?;
    info!("Connected to database");

    let policy = PlanPolicy::from_config(&config.plan)?;
    info!(
        free_monthly_limit = policy.free_monthly_limit,
        timezone = %policy.timezone,
        "Plan policy loaded"
    );

    let payments = StripeClient::new(&config.billing)?;

    let state = AppState {
        db,
        jwt_service: Arc::new(JwtService::new(config.jwt.clone())),
        payments: Arc::new(payments),
        policy,
        checkout: CheckoutSettings::from_config(&config.billing),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
