//! Checkout creation and payment verification routes.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the billing routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/billing/checkout", post(create_checkout))
        .route("/billing/verify", post(verify_payment))
}

/// Optional body of a verification request.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyPaymentRequest {
    /// Checkout session to verify; without it, recent payments are searched.
    #[serde(default, rename = "sessionId", alias = "session_id")]
    pub session_id: Option<String>,
}

impl VerifyPaymentRequest {
    /// Parses the body; an empty body means no session ID.
    fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }
}

const VERIFY_FAILED: &str = "Failed to verify payment";

fn verify_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": VERIFY_FAILED })),
    )
        .into_response()
}

/// POST `/billing/checkout` - Create a hosted checkout page for the caller.
async fn create_checkout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let link = state.billing().create_checkout(auth.identity()).await?;
    Ok(Json(json!({ "url": link.url })))
}

/// POST `/billing/verify` - Verify a payment and upgrade the caller.
///
/// Every failure answers the same generic body with status 500.
async fn verify_payment(State(state): State<AppState>, auth: AuthUser, body: Bytes) -> Response {
    let request = match VerifyPaymentRequest::from_body(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(user_id = %auth.user_id(), error = %e, "Malformed verification request");
            return verify_failure();
        }
    };

    match state
        .billing()
        .verify_payment(auth.identity(), request.session_id.as_deref())
        .await
    {
        Ok(upgrade) => Json(json!({
            "success": true,
            "subscription_end": upgrade.subscription_end,
        }))
        .into_response(),
        Err(e) => {
            error!(user_id = %auth.user_id(), error = %e, "Payment verification failed");
            verify_failure()
        }
    }
}
