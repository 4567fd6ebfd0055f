//! Category workflows.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use finora_shared::Identity;
use tracing::info;
use uuid::Uuid;

use super::error::CategoryError;
use super::types::{Category, CategoryDraft, MAX_NAME_LEN, NewCategory};
use crate::store::StoreError;
use crate::transaction::TransactionKind;

/// Persistence for categories.
pub trait CategoryStore: Send + Sync {
    /// List an owner's categories ordered by name, optionally of one kind.
    fn list(
        &self,
        user_id: Uuid,
        kind: Option<TransactionKind>,
    ) -> impl std::future::Future<Output = Result<Vec<Category>, StoreError>> + Send;

    /// Persist a category. Fails with `StoreError::Conflict` when the owner
    /// already has one with the same kind and case-insensitive name.
    fn insert(
        &self,
        draft: CategoryDraft,
    ) -> impl std::future::Future<Output = Result<Category, StoreError>> + Send;

    /// Delete one of an owner's categories. Returns false if it does not exist.
    fn delete(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;
}

/// Category workflows over a [`CategoryStore`].
pub struct CategoryService<C: CategoryStore> {
    store: Arc<C>,
}

impl<C: CategoryStore> CategoryService<C> {
    /// Create a new category service.
    #[must_use]
    pub const fn new(store: Arc<C>) -> Self {
        Self { store }
    }

    /// Validate a proposed category for `owner`.
    pub fn validate(owner: Uuid, input: &NewCategory) -> Result<CategoryDraft, CategoryError> {
        let kind = TransactionKind::from_str(&input.kind).map_err(CategoryError::Validation)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(CategoryError::Validation("name is required".to_string()));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(CategoryError::Validation(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        Ok(CategoryDraft {
            user_id: owner,
            name: name.to_string(),
            kind,
        })
    }

    /// List the caller's categories.
    pub async fn list(
        &self,
        identity: &Identity,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>, CategoryError> {
        if !identity.is_active_at(Utc::now()) {
            return Err(CategoryError::Unauthenticated);
        }

        self.store
            .list(identity.user_id, kind)
            .await
            .map_err(|e| CategoryError::Store(e.to_string()))
    }

    /// Create a category for the caller.
    pub async fn create(
        &self,
        identity: &Identity,
        input: &NewCategory,
    ) -> Result<Category, CategoryError> {
        if !identity.is_active_at(Utc::now()) {
            return Err(CategoryError::Unauthenticated);
        }

        let draft = Self::validate(identity.user_id, input)?;
        let name = draft.name.clone();

        let category = self.store.insert(draft).await.map_err(|e| match e {
            StoreError::Conflict(_) => CategoryError::Duplicate(name),
            other => CategoryError::Store(other.to_string()),
        })?;

        info!(
            user_id = %identity.user_id,
            category_id = %category.id,
            "Category created"
        );
        Ok(category)
    }

    /// Delete one of the caller's categories.
    ///
    /// Transactions keep their label; only the category entry goes away.
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), CategoryError> {
        if !identity.is_active_at(Utc::now()) {
            return Err(CategoryError::Unauthenticated);
        }

        let deleted = self
            .store
            .delete(identity.user_id, id)
            .await
            .map_err(|e| CategoryError::Store(e.to_string()))?;

        if deleted {
            Ok(())
        } else {
            Err(CategoryError::NotFound(id))
        }
    }
}
