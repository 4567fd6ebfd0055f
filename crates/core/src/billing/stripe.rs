//! Stripe REST client.

use std::collections::HashMap;
use std::time::Duration;

use chrono::DateTime;
use finora_shared::config::BillingConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ProviderError;
use super::provider::PaymentProvider;
use super::types::{CheckoutLink, CheckoutRequest, CheckoutSessionInfo, PaymentIntentInfo};

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("api_base", &self.api_base)
            .field("secret_key", &"[hidden]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct List<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: Option<HashMap<String, String>>,
    #[serde(default)]
    payment_status: String,
}

#[derive(Debug, Deserialize)]
struct PaymentIntent {
    id: String,
    amount: i64,
    status: String,
    created: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

impl StripeClient {
    /// Creates a client from the billing configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &BillingConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.stripe_secret_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T, ProviderError> {
        let response = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::Decode(e.to_string()));
        }

        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error.message)
            .unwrap_or_else(|| status.to_string());

        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Stripe object IDs are ASCII alphanumerics and underscores; anything else
/// would change the request path.
fn is_valid_object_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn checkout_form(request: &CheckoutRequest) -> Vec<(String, String)> {
    let user_id = request.user_id.to_string();
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        ("client_reference_id".to_string(), user_id.clone()),
        ("metadata[user_id]".to_string(), user_id),
        (
            "line_items[0][price_data][currency]".to_string(),
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            request.amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            request.product_name.clone(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
    ];
    if let Some(email) = &request.customer_email {
        form.push(("customer_email".to_string(), email.clone()));
    }
    form
}

impl PaymentProvider for StripeClient {
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionInfo, ProviderError> {
        if !is_valid_object_id(session_id) {
            return Err(ProviderError::InvalidRequest(format!(
                "malformed checkout session id: {session_id}"
            )));
        }

        let session: CheckoutSession = self
            .get(&format!("/v1/checkout/sessions/{session_id}"), &[])
            .await?;

        debug!(
            session_id = %session.id,
            payment_status = %session.payment_status,
            "Retrieved checkout session"
        );

        Ok(CheckoutSessionInfo {
            id: session.id,
            client_reference_id: session.client_reference_id,
            metadata_user_id: session.metadata.and_then(|mut m| m.remove("user_id")),
            payment_status: session.payment_status,
        })
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<String>, ProviderError> {
        let customers: List<Customer> = self
            .get("/v1/customers", &[("email", email), ("limit", "1")])
            .await?;

        Ok(customers.data.into_iter().next().map(|c| c.id))
    }

    async fn list_payment_intents(
        &self,
        customer_id: &str,
        limit: u8,
    ) -> Result<Vec<PaymentIntentInfo>, ProviderError> {
        let limit = limit.to_string();
        let intents: List<PaymentIntent> = self
            .get(
                "/v1/payment_intents",
                &[("customer", customer_id), ("limit", limit.as_str())],
            )
            .await?;

        intents
            .data
            .into_iter()
            .map(|intent| {
                let created = DateTime::from_timestamp(intent.created, 0).ok_or_else(|| {
                    ProviderError::Decode(format!("invalid timestamp {}", intent.created))
                })?;
                Ok(PaymentIntentInfo {
                    id: intent.id,
                    status: intent.status,
                    amount: intent.amount,
                    created,
                })
            })
            .collect()
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutLink, ProviderError> {
        let session: CheckoutSession = self
            .post_form("/v1/checkout/sessions", &checkout_form(request))
            .await?;

        let url = session
            .url
            .ok_or_else(|| ProviderError::Decode("checkout session has no url".to_string()))?;

        Ok(CheckoutLink {
            id: session.id,
            url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Form, Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use uuid::Uuid;

    const KEY: &str = "sk_test_123";

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {KEY}"))
    }

    async fn session(headers: HeaderMap, Path(id): Path<String>) -> impl IntoResponse {
        if !authorized(&headers) {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": {"message": "Invalid API Key provided"}})),
            );
        }
        if id == "cs_missing" {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({"error": {"message": "No such checkout.session"}})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({
                "id": id,
                "object": "checkout.session",
                "client_reference_id": null,
                "metadata": {"user_id": "3f1c6b2e-0000-4000-8000-000000000001"},
                "payment_status": "paid",
                "url": null
            })),
        )
    }

    async fn customers(Query(q): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        let data = if q.get("email").map(String::as_str) == Some("ana@example.com") {
            json!([{"id": "cus_123", "email": "ana@example.com"}])
        } else {
            json!([])
        };
        Json(json!({"object": "list", "data": data}))
    }

    async fn payment_intents(Query(q): Query<HashMap<String, String>>) -> Json<serde_json::Value> {
        assert_eq!(q.get("customer").map(String::as_str), Some("cus_123"));
        assert_eq!(q.get("limit").map(String::as_str), Some("10"));
        Json(json!({
            "object": "list",
            "data": [
                {"id": "pi_1", "amount": 1990, "status": "succeeded", "created": 1_710_500_000},
                {"id": "pi_2", "amount": 1990, "status": "canceled", "created": 1_710_400_000}
            ]
        }))
    }

    async fn create_session(Form(form): Form<HashMap<String, String>>) -> Json<serde_json::Value> {
        Json(json!({
            "id": "cs_new",
            "url": "https://checkout.stripe.test/c/pay/cs_new",
            "payment_status": "unpaid",
            "client_reference_id": form.get("client_reference_id"),
            "metadata": {"user_id": form.get("metadata[user_id]")}
        }))
    }

    async fn spawn_fake_stripe() -> String {
        let app = Router::new()
            .route("/v1/checkout/sessions/{id}", get(session))
            .route("/v1/checkout/sessions", axum::routing::post(create_session))
            .route("/v1/customers", get(customers))
            .route("/v1/payment_intents", get(payment_intents));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn client(api_base: String, key: &str) -> StripeClient {
        StripeClient::new(&BillingConfig {
            stripe_secret_key: key.to_string(),
            api_base,
            currency: "brl".to_string(),
            product_name: "Plano Premium".to_string(),
            success_url: "http://localhost/ok".to_string(),
            cancel_url: "http://localhost/cancel".to_string(),
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_session_reads_metadata_correlation() {
        let stripe = client(spawn_fake_stripe().await, KEY);

        let session = stripe.retrieve_checkout_session("cs_test_42").await.unwrap();

        assert_eq!(session.id, "cs_test_42");
        assert_eq!(session.payment_status, "paid");
        assert_eq!(
            session.correlation_id(),
            Some("3f1c6b2e-0000-4000-8000-000000000001")
        );
    }

    #[tokio::test]
    async fn test_api_errors_carry_status_and_message() {
        let base = spawn_fake_stripe().await;

        let missing = client(base.clone(), KEY)
            .retrieve_checkout_session("cs_missing")
            .await;
        assert!(matches!(
            missing,
            Err(ProviderError::Api { status: 404, ref message }) if message == "No such checkout.session"
        ));

        let unauthorized = client(base, "sk_wrong")
            .retrieve_checkout_session("cs_test_42")
            .await;
        assert!(matches!(
            unauthorized,
            Err(ProviderError::Api { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_session_id_is_not_sent() {
        let stripe = client("http://127.0.0.1:9".to_string(), KEY);
        let result = stripe.retrieve_checkout_session("../customers").await;
        assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_find_customer_by_email() {
        let stripe = client(spawn_fake_stripe().await, KEY);

        assert_eq!(
            stripe.find_customer_by_email("ana@example.com").await.unwrap(),
            Some("cus_123".to_string())
        );
        assert_eq!(
            stripe.find_customer_by_email("bob@example.com").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_list_payment_intents() {
        let stripe = client(spawn_fake_stripe().await, KEY);

        let intents = stripe.list_payment_intents("cus_123", 10).await.unwrap();

        assert_eq!(intents.len(), 2);
        assert_eq!(intents[0].status, "succeeded");
        assert_eq!(intents[0].amount, 1990);
        assert_eq!(intents[0].created.timestamp(), 1_710_500_000);
    }

    #[tokio::test]
    async fn test_create_checkout_session_sends_correlation_fields() {
        let stripe = client(spawn_fake_stripe().await, KEY);
        let user_id = Uuid::new_v4();

        let link = stripe
            .create_checkout_session(&CheckoutRequest {
                user_id,
                customer_email: Some("ana@example.com".to_string()),
                amount: 1990,
                currency: "brl".to_string(),
                product_name: "Plano Premium".to_string(),
                success_url: "http://localhost/ok".to_string(),
                cancel_url: "http://localhost/cancel".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(link.id, "cs_new");
        assert_eq!(link.url, "https://checkout.stripe.test/c/pay/cs_new");
    }

    #[test]
    fn test_checkout_form_fields() {
        let user_id = Uuid::new_v4();
        let form: HashMap<String, String> = checkout_form(&CheckoutRequest {
            user_id,
            customer_email: None,
            amount: 1990,
            currency: "brl".to_string(),
            product_name: "Plano Premium".to_string(),
            success_url: "http://localhost/ok".to_string(),
            cancel_url: "http://localhost/cancel".to_string(),
        })
        .into_iter()
        .collect();

        assert_eq!(form["mode"], "payment");
        assert_eq!(form["client_reference_id"], user_id.to_string());
        assert_eq!(form["metadata[user_id]"], user_id.to_string());
        assert_eq!(form["line_items[0][price_data][unit_amount]"], "1990");
        assert_eq!(form["line_items[0][price_data][currency]"], "brl");
        assert_eq!(form["line_items[0][quantity]"], "1");
        assert!(!form.contains_key("customer_email"));
    }
}
