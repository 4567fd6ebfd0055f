//! Transaction routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use finora_core::transaction::{
    NewTransaction, TransactionError, TransactionFilter, TransactionKind,
};
use finora_shared::types::PageRequest;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/{transaction_id}", delete(delete_transaction))
}

/// Query parameters for listing transactions.
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    /// Calendar month (1-12), requires `year`.
    pub month: Option<u32>,
    /// Calendar year.
    pub year: Option<i32>,
    /// `income`, `expense`, `entrada` or `saida`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u32>,
}

impl ListTransactionsQuery {
    fn filter(&self) -> Result<TransactionFilter, TransactionError> {
        let kind = self
            .kind
            .as_deref()
            .map(str::parse::<TransactionKind>)
            .transpose()
            .map_err(|_| TransactionError::Validation("type must be income or expense".into()))?;

        Ok(TransactionFilter {
            month: self.month,
            year: self.year,
            kind,
        })
    }
}

/// POST `/transactions` - Ingest a transaction for the caller.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let transaction = state
        .transactions()
        .create(auth.identity(), &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET `/transactions` - List the caller's transactions, newest first.
async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query.filter()?;
    let page = PageRequest::new(query.page, query.per_page);

    let response = state
        .transactions()
        .list(auth.identity(), filter, page)
        .await?;

    Ok(Json(response))
}

/// DELETE `/transactions/{transaction_id}` - Delete one of the caller's transactions.
async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .transactions()
        .delete(auth.identity(), transaction_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
