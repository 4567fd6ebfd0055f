//! Transaction repository for database operations.

use chrono::{DateTime, Utc};
use finora_core::StoreError;
use finora_core::transaction::{Transaction, TransactionDraft, TransactionFilter, TransactionStore};
use finora_shared::types::PageRequest;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::{from_db_kind, read_error, to_db_kind, write_error};
use crate::entities::transactions;
use crate::rls::RlsConnection;

/// Transaction repository implementation.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Create a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl TransactionStore for TransactionRepository {
    async fn insert(&self, draft: TransactionDraft) -> Result<Transaction, StoreError> {
        let rls = RlsConnection::new(&self.db, draft.user_id)
            .await
            .map_err(write_error)?;

        let model = transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(draft.user_id),
            date: Set(draft.date),
            value: Set(draft.value),
            category: Set(draft.category),
            description: Set(draft.description),
            kind: Set(to_db_kind(draft.kind)),
            created_at: Set(Utc::now().into()),
        }
        .insert(rls.transaction())
        .await
        .map_err(write_error)?;

        rls.commit().await.map_err(write_error)?;

        Ok(to_domain(model))
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Transaction>, u64), StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(read_error)?;

        let mut query =
            transactions::Entity::find().filter(transactions::Column::UserId.eq(user_id));
        if let Some((start, end)) = filter.date_range() {
            query = query
                .filter(transactions::Column::Date.gte(start))
                .filter(transactions::Column::Date.lt(end));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(transactions::Column::Kind.eq(to_db_kind(kind)));
        }

        let total = query
            .clone()
            .count(rls.transaction())
            .await
            .map_err(read_error)?;

        let models = query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(rls.transaction())
            .await
            .map_err(read_error)?;

        rls.commit().await.map_err(read_error)?;

        Ok((models.into_iter().map(to_domain).collect(), total))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(write_error)?;

        let result = transactions::Entity::delete_many()
            .filter(transactions::Column::Id.eq(id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(rls.transaction())
            .await
            .map_err(write_error)?;

        rls.commit().await.map_err(write_error)?;

        Ok(result.rows_affected > 0)
    }

    async fn count_created(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(read_error)?;

        let count = transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::CreatedAt.gte(from))
            .filter(transactions::Column::CreatedAt.lt(to))
            .count(rls.transaction())
            .await
            .map_err(read_error)?;

        rls.commit().await.map_err(read_error)?;

        Ok(count)
    }
}

fn to_domain(model: transactions::Model) -> Transaction {
    Transaction {
        id: model.id,
        user_id: model.user_id,
        date: model.date,
        value: model.value,
        category: model.category,
        description: model.description,
        kind: from_db_kind(model.kind),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
