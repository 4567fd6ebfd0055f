//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes under `/api/v1`
//! - Bearer-token authentication middleware
//! - JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use finora_core::billing::{BillingService, CheckoutSettings, StripeClient};
use finora_core::category::CategoryService;
use finora_core::plan::PlanPolicy;
use finora_core::quota::QuotaService;
use finora_core::transaction::TransactionService;
use finora_db::{CategoryRepository, PlanLimitRepository, ProfileRepository, TransactionRepository};
use finora_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DatabaseConnection,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Payment provider client.
    pub payments: Arc<StripeClient>,
    /// Plan rules.
    pub policy: PlanPolicy,
    /// Hosted checkout settings.
    pub checkout: CheckoutSettings,
}

impl AppState {
    /// Quota service over the plan limit table.
    #[must_use]
    pub fn quota(&self) -> QuotaService<PlanLimitRepository> {
        QuotaService::new(
            Arc::new(PlanLimitRepository::new(self.db.clone())),
            self.policy,
        )
    }

    /// Transaction ingestion workflow.
    #[must_use]
    pub fn transactions(&self) -> TransactionService<TransactionRepository, PlanLimitRepository> {
        TransactionService::new(
            Arc::new(TransactionRepository::new(self.db.clone())),
            self.quota(),
        )
    }

    /// Checkout and payment verification workflows.
    #[must_use]
    pub fn billing(&self) -> BillingService<StripeClient, ProfileRepository, PlanLimitRepository> {
        BillingService::new(
            Arc::clone(&self.payments),
            Arc::new(self.profiles()),
            self.quota(),
            self.checkout.clone(),
        )
    }

    /// Category workflow.
    #[must_use]
    pub fn categories(&self) -> CategoryService<CategoryRepository> {
        CategoryService::new(Arc::new(CategoryRepository::new(self.db.clone())))
    }

    /// Profile repository.
    #[must_use]
    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.db.clone())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
