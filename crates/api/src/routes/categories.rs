//! Category routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use finora_core::category::{CategoryError, NewCategory};
use finora_core::transaction::TransactionKind;
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, middleware::AuthUser};

/// Creates the category routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{category_id}", delete(delete_category))
}

/// Query parameters for listing categories.
#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    /// Only categories of this direction.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// GET `/categories` - List the caller's categories by name.
async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<TransactionKind>)
        .transpose()
        .map_err(CategoryError::Validation)?;

    let categories = state.categories().list(auth.identity(), kind).await?;
    Ok(Json(categories))
}

/// POST `/categories` - Create a category.
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let category = state
        .categories()
        .create(auth.identity(), &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// DELETE `/categories/{category_id}` - Delete a category; transactions keep their label.
async fn delete_category(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(category_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .categories()
        .delete(auth.identity(), category_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
