//! Plan limit repository: monthly transaction counters.

use finora_core::StoreError;
use finora_core::plan::Period;
use finora_core::quota::{PlanLimitRecord, PlanLimitStore};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, QueryFilter, Statement, Value,
};
use uuid::Uuid;

use super::{read_error, write_error};
use crate::entities::plan_limits;
use crate::rls::RlsConnection;

/// Insert-or-add-one in a single statement. Concurrent calls serialize on the
/// `(user_id, month, year)` unique key, so no increment is lost.
const INCREMENT_SQL: &str = r"
INSERT INTO plan_limits (user_id, month, year, transaction_count)
VALUES ($1, $2, $3, 1)
ON CONFLICT (user_id, month, year)
DO UPDATE SET
    transaction_count = plan_limits.transaction_count + 1,
    updated_at = now()
RETURNING *
";

/// Insert-or-raise: the counter only ever moves up to the given value.
const RAISE_SQL: &str = r"
INSERT INTO plan_limits (user_id, month, year, transaction_count)
VALUES ($1, $2, $3, $4)
ON CONFLICT (user_id, month, year)
DO UPDATE SET
    transaction_count = GREATEST(plan_limits.transaction_count, EXCLUDED.transaction_count),
    updated_at = now()
RETURNING *
";

/// Plan limit repository implementation.
#[derive(Debug, Clone)]
pub struct PlanLimitRepository {
    db: DatabaseConnection,
}

impl PlanLimitRepository {
    /// Create a new plan limit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs one of the upsert statements and returns the resulting row.
    async fn upsert(
        &self,
        user_id: Uuid,
        sql: &str,
        values: Vec<Value>,
    ) -> Result<PlanLimitRecord, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(write_error)?;

        let model = plan_limits::Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                values,
            ))
            .one(rls.transaction())
            .await
            .map_err(write_error)?
            .ok_or_else(|| StoreError::Write("plan limit upsert returned no row".to_string()))?;

        rls.commit().await.map_err(write_error)?;

        to_domain(model)
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn month_column(period: Period) -> i32 {
    period.month as i32
}

impl PlanLimitStore for PlanLimitRepository {
    async fn find(
        &self,
        user_id: Uuid,
        period: Period,
    ) -> Result<Option<PlanLimitRecord>, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(read_error)?;

        let model = plan_limits::Entity::find()
            .filter(plan_limits::Column::UserId.eq(user_id))
            .filter(plan_limits::Column::Month.eq(month_column(period)))
            .filter(plan_limits::Column::Year.eq(period.year))
            .one(rls.transaction())
            .await
            .map_err(read_error)?;

        rls.commit().await.map_err(read_error)?;

        model.map(to_domain).transpose()
    }

    async fn increment(&self, user_id: Uuid, period: Period) -> Result<PlanLimitRecord, StoreError> {
        self.upsert(
            user_id,
            INCREMENT_SQL,
            vec![
                user_id.into(),
                month_column(period).into(),
                period.year.into(),
            ],
        )
        .await
    }

    async fn raise_count(
        &self,
        user_id: Uuid,
        period: Period,
        count: u32,
    ) -> Result<PlanLimitRecord, StoreError> {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        self.upsert(
            user_id,
            RAISE_SQL,
            vec![
                user_id.into(),
                month_column(period).into(),
                period.year.into(),
                count.into(),
            ],
        )
        .await
    }

    async fn set_limit_reached(
        &self,
        user_id: Uuid,
        period: Period,
        reached: bool,
    ) -> Result<(), StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(write_error)?;

        plan_limits::Entity::update_many()
            .col_expr(plan_limits::Column::LimitReached, Expr::value(reached))
            .col_expr(plan_limits::Column::UpdatedAt, Expr::cust("now()"))
            .filter(plan_limits::Column::UserId.eq(user_id))
            .filter(plan_limits::Column::Month.eq(month_column(period)))
            .filter(plan_limits::Column::Year.eq(period.year))
            .exec(rls.transaction())
            .await
            .map_err(write_error)?;

        rls.commit().await.map_err(write_error)
    }
}

fn to_domain(model: plan_limits::Model) -> Result<PlanLimitRecord, StoreError> {
    let period = u32::try_from(model.month)
        .ok()
        .and_then(|month| Period::new(month, model.year))
        .ok_or_else(|| StoreError::Read(format!("invalid plan limit month {}", model.month)))?;

    let transaction_count = u32::try_from(model.transaction_count).map_err(|_| {
        StoreError::Read(format!(
            "invalid plan limit transaction count {}",
            model.transaction_count
        ))
    })?;

    Ok(PlanLimitRecord {
        user_id: model.user_id,
        period,
        transaction_count,
        limit_reached: model.limit_reached,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{MockDatabase, MockExecResult};

    fn row(user_id: Uuid, count: i32) -> plan_limits::Model {
        plan_limits::Model {
            id: Uuid::new_v4(),
            user_id,
            month: 3,
            year: 2024,
            transaction_count: count,
            limit_reached: false,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn set_local() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    #[tokio::test]
    async fn test_increment_is_one_upsert_statement() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([set_local()])
            .append_query_results([[row(user_id, 6)]])
            .into_connection();
        let repo = PlanLimitRepository::new(db.clone());
        let march = Period::new(3, 2024).unwrap();

        let record = repo.increment(user_id, march).await.unwrap();

        assert_eq!(record.transaction_count, 6);
        assert_eq!(record.period, march);

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&format!("SET LOCAL app.current_user_id = '{user_id}'")));
        assert!(log.contains("ON CONFLICT (user_id, month, year)"));
        assert_eq!(log.matches("INSERT INTO plan_limits").count(), 1);
        assert!(!log.contains("SELECT"));
    }

    #[tokio::test]
    async fn test_raise_count_uses_greatest() {
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([set_local()])
            .append_query_results([[row(user_id, 9)]])
            .into_connection();
        let repo = PlanLimitRepository::new(db.clone());

        let record = repo
            .raise_count(user_id, Period::new(3, 2024).unwrap(), 9)
            .await
            .unwrap();

        assert_eq!(record.transaction_count, 9);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("GREATEST(plan_limits.transaction_count"));
    }

    #[tokio::test]
    async fn test_find_missing_record() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([set_local()])
            .append_query_results([Vec::<plan_limits::Model>::new()])
            .into_connection();
        let repo = PlanLimitRepository::new(db);

        let record = repo
            .find(Uuid::new_v4(), Period::new(3, 2024).unwrap())
            .await
            .unwrap();

        assert_eq!(record, None);
    }

    #[test]
    fn test_corrupt_month_is_a_read_error() {
        let mut model = row(Uuid::new_v4(), 1);
        model.month = 13;
        assert!(matches!(to_domain(model), Err(StoreError::Read(_))));
    }

    #[test]
    fn test_negative_count_is_a_read_error() {
        let model = row(Uuid::new_v4(), -3);
        assert!(matches!(to_domain(model), Err(StoreError::Read(_))));
    }
}
