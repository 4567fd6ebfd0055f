//! Category repository.

use chrono::Utc;
use finora_core::StoreError;
use finora_core::category::{Category, CategoryDraft, CategoryStore};
use finora_core::transaction::TransactionKind;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::{from_db_kind, read_error, to_db_kind, write_error};
use crate::entities::categories;
use crate::rls::RlsConnection;

/// Category repository implementation.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl CategoryStore for CategoryRepository {
    async fn list(
        &self,
        user_id: Uuid,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(read_error)?;

        let mut query =
            categories::Entity::find().filter(categories::Column::UserId.eq(user_id));
        if let Some(kind) = kind {
            query = query.filter(categories::Column::Kind.eq(to_db_kind(kind)));
        }

        let models = query
            .order_by_asc(categories::Column::Name)
            .all(rls.transaction())
            .await
            .map_err(read_error)?;

        rls.commit().await.map_err(read_error)?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn insert(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        let rls = RlsConnection::new(&self.db, draft.user_id)
            .await
            .map_err(write_error)?;

        let model = categories::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(draft.user_id),
            name: Set(draft.name),
            kind: Set(to_db_kind(draft.kind)),
            created_at: Set(Utc::now().into()),
        }
        .insert(rls.transaction())
        .await
        .map_err(write_error)?;

        rls.commit().await.map_err(write_error)?;

        Ok(to_domain(model))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(write_error)?;

        let result = categories::Entity::delete_many()
            .filter(categories::Column::Id.eq(id))
            .filter(categories::Column::UserId.eq(user_id))
            .exec(rls.transaction())
            .await
            .map_err(write_error)?;

        rls.commit().await.map_err(write_error)?;

        Ok(result.rows_affected > 0)
    }
}

fn to_domain(model: categories::Model) -> Category {
    Category {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        kind: from_db_kind(model.kind),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
