//! Profile repository.

use chrono::{DateTime, Utc};
use finora_core::StoreError;
use finora_core::plan::{PlanTier, ProfileStore, UserProfile};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use super::{read_error, write_error};
use crate::entities::profiles;
use crate::entities::sea_orm_active_enums::PlanTier as DbPlanTier;
use crate::rls::RlsConnection;

/// Profile repository implementation.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ProfileStore for ProfileRepository {
    async fn find(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(read_error)?;

        let model = profiles::Entity::find_by_id(user_id)
            .one(rls.transaction())
            .await
            .map_err(read_error)?;

        rls.commit().await.map_err(read_error)?;

        Ok(model.map(to_domain))
    }

    async fn set_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        subscription_end: Option<DateTime<Utc>>,
    ) -> Result<UserProfile, StoreError> {
        let rls = RlsConnection::new(&self.db, user_id)
            .await
            .map_err(write_error)?;

        let now = Utc::now();
        let model = profiles::ActiveModel {
            id: Set(user_id),
            name: Set(None),
            plan: Set(to_db_tier(plan)),
            subscription_end: Set(subscription_end.map(Into::into)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let stored = profiles::Entity::insert(model)
            .on_conflict(
                OnConflict::column(profiles::Column::Id)
                    .update_columns([
                        profiles::Column::Plan,
                        profiles::Column::SubscriptionEnd,
                        profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(rls.transaction())
            .await
            .map_err(write_error)?;

        rls.commit().await.map_err(write_error)?;

        Ok(to_domain(stored))
    }
}

const fn to_db_tier(tier: PlanTier) -> DbPlanTier {
    match tier {
        PlanTier::Free => DbPlanTier::Free,
        PlanTier::Premium => DbPlanTier::Premium,
        PlanTier::Master => DbPlanTier::Master,
    }
}

const fn from_db_tier(tier: DbPlanTier) -> PlanTier {
    match tier {
        DbPlanTier::Free => PlanTier::Free,
        DbPlanTier::Premium => PlanTier::Premium,
        DbPlanTier::Master => PlanTier::Master,
    }
}

fn to_domain(model: profiles::Model) -> UserProfile {
    UserProfile {
        id: model.id,
        name: model.name,
        plan: from_db_tier(model.plan),
        subscription_end: model.subscription_end.map(|end| end.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DbBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_maps_tier_and_expiry() {
        let user_id = Uuid::new_v4();
        let end = Utc::now() + Duration::days(30);
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([[profiles::Model {
                id: user_id,
                name: Some("Ana".to_string()),
                plan: DbPlanTier::Premium,
                subscription_end: Some(end.into()),
                created_at: Utc::now().into(),
                updated_at: Utc::now().into(),
            }]])
            .into_connection();
        let repo = ProfileRepository::new(db);

        let profile = repo.find(user_id).await.unwrap().unwrap();

        assert_eq!(profile.plan, PlanTier::Premium);
        assert_eq!(profile.subscription_end, Some(end));
        assert_eq!(profile.effective_tier(Utc::now()), PlanTier::Premium);
    }

    #[test]
    fn test_tier_mapping_round_trips() {
        for tier in [PlanTier::Free, PlanTier::Premium, PlanTier::Master] {
            assert_eq!(from_db_tier(to_db_tier(tier)), tier);
        }
    }
}
