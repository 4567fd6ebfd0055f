//! Plan and quota status route.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use finora_core::plan::{PlanTier, ProfileStore, UserProfile};
use finora_core::quota::QuotaUsage;
use finora_shared::AppError;
use serde::Serialize;
use tracing::warn;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the plan routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/plan", get(get_plan))
}

/// Response for the caller's plan.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    /// Stored tier.
    pub plan: PlanTier,
    /// Tier in force now, after expiry.
    pub effective_plan: PlanTier,
    /// End of the paid entitlement, if any.
    pub subscription_end: Option<DateTime<Utc>>,
    /// True when a paid tier is in force.
    pub active: bool,
    /// Quota usage for the current period.
    pub usage: QuotaUsage,
}

impl PlanResponse {
    fn new(profile: &UserProfile, usage: QuotaUsage, now: DateTime<Utc>) -> Self {
        Self {
            plan: profile.plan,
            effective_plan: profile.effective_tier(now),
            subscription_end: profile.subscription_end,
            active: profile.has_active_subscription(now),
            usage,
        }
    }
}

/// GET `/plan` - The caller's tier and current quota usage.
///
/// A user without a profile row yet is reported as free. The quota counter is
/// reconciled against the caller's transactions first; a failed reconciliation
/// is logged and the stored counter is reported as is.
async fn get_plan(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let user_id = auth.user_id();

    let profile = state
        .profiles()
        .find(user_id)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .unwrap_or_else(|| UserProfile::free(user_id));

    if let Err(e) = state
        .transactions()
        .reconcile_quota(auth.identity(), now)
        .await
    {
        warn!(user_id = %user_id, error = %e, "Failed to reconcile quota counter");
    }

    let usage = state
        .quota()
        .usage(&profile, now)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(PlanResponse::new(&profile, usage, now)))
}
