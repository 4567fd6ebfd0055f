//! Transaction ingestion workflow.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use finora_shared::Identity;
use finora_shared::types::{PageRequest, PageResponse};
use tracing::{info, warn};
use uuid::Uuid;

use super::error::TransactionError;
use super::types::{NewTransaction, Transaction, TransactionDraft, TransactionFilter};
use super::validation;
use crate::quota::{PlanLimitStore, QuotaError, QuotaService};
use crate::store::StoreError;

/// Age in seconds a transaction must reach before the quota recount sees it.
///
/// Must exceed the time between a transaction's insert and its quota increment,
/// or the recount could count a row whose increment is still to come.
pub const RECONCILE_GRACE_SECS: i64 = 300;

/// Persistence for transactions.
///
/// Every method is scoped to one owner; implementations must never return or
/// touch rows of another user.
pub trait TransactionStore: Send + Sync {
    /// Persist a validated transaction, assigning ID and creation timestamp.
    fn insert(
        &self,
        draft: TransactionDraft,
    ) -> impl std::future::Future<Output = Result<Transaction, StoreError>> + Send;

    /// List an owner's transactions, newest date first, with the total match count.
    fn list(
        &self,
        user_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<Transaction>, u64), StoreError>> + Send;

    /// Delete one of an owner's transactions. Returns false if it does not exist.
    fn delete(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Count an owner's transactions created in `[from, to)`, by creation time.
    fn count_created(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;
}

/// Transaction workflow over a transaction store and a quota store.
pub struct TransactionService<T: TransactionStore, Q: PlanLimitStore> {
    store: Arc<T>,
    quota: QuotaService<Q>,
}

impl<T: TransactionStore, Q: PlanLimitStore> TransactionService<T, Q> {
    /// Create a new transaction service.
    #[must_use]
    pub const fn new(store: Arc<T>, quota: QuotaService<Q>) -> Self {
        Self { store, quota }
    }

    /// Ingest a proposed transaction for the caller.
    ///
    /// # Errors
    ///
    /// See [`Self::create_at`].
    pub async fn create(
        &self,
        identity: &Identity,
        input: &NewTransaction,
    ) -> Result<Transaction, TransactionError> {
        self.create_at(identity, input, Utc::now()).await
    }

    /// Ingest a proposed transaction for the caller as of `now`.
    ///
    /// The transaction is written first. Counting it against the quota period
    /// containing `now` happens afterwards and may fail without undoing the write.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the identity is not active at `now`
    /// - `Validation` for a malformed date, value, type or category
    /// - `StoreWrite` if the store rejects the transaction
    pub async fn create_at(
        &self,
        identity: &Identity,
        input: &NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction, TransactionError> {
        if !identity.is_active_at(now) {
            return Err(TransactionError::Unauthenticated);
        }

        if input.user_id.is_some_and(|claimed| claimed != identity.user_id) {
            warn!(
                user_id = %identity.user_id,
                "Ignoring client-supplied owner on new transaction"
            );
        }

        let draft = validation::validate(identity.user_id, input)?;

        let transaction = self
            .store
            .insert(draft)
            .await
            .map_err(|e| TransactionError::StoreWrite(e.to_string()))?;

        info!(
            user_id = %transaction.user_id,
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            "Transaction created"
        );

        let period = self.quota.policy().period_at(now);
        if let Err(e) = self.quota.record_transaction(identity.user_id, period).await {
            warn!(
                user_id = %identity.user_id,
                period = %period,
                error = %e,
                "Failed to count transaction against quota"
            );
        }

        Ok(transaction)
    }

    /// Recount the caller's transactions created in the current quota period
    /// and raise the quota counter if increments were lost.
    ///
    /// Only transactions older than [`RECONCILE_GRACE_SECS`] are recounted. A
    /// younger row may still be waiting for its own increment, so counting it
    /// here would count it twice. Deleted transactions are not seen by the
    /// recount, so the counter is only ever raised here.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the identity is not active at `now`
    /// - `StoreRead` if the transactions or the counter cannot be read
    /// - `StoreWrite` if the counter cannot be raised
    pub async fn reconcile_quota(
        &self,
        identity: &Identity,
        now: DateTime<Utc>,
    ) -> Result<u32, TransactionError> {
        if !identity.is_active_at(now) {
            return Err(TransactionError::Unauthenticated);
        }

        let policy = self.quota.policy();
        let period = policy.period_at(now);
        let Some((from, to)) = period.bounds(policy.timezone) else {
            return Err(TransactionError::StoreRead(format!(
                "period {period} has no representable bounds"
            )));
        };

        let settled_before = to.min(now - Duration::seconds(RECONCILE_GRACE_SECS));
        let created = if settled_before > from {
            self.store
                .count_created(identity.user_id, from, settled_before)
                .await
                .map_err(|e| TransactionError::StoreRead(e.to_string()))?
        } else {
            0
        };
        let observed = u32::try_from(created).unwrap_or(u32::MAX);

        self.quota
            .reconcile(identity.user_id, period, observed)
            .await
            .map_err(|e| match e {
                QuotaError::Read(msg) => TransactionError::StoreRead(msg),
                QuotaError::Write(msg) => TransactionError::StoreWrite(msg),
            })
    }

    /// List the caller's transactions.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the identity is no longer active
    /// - `Validation` for an impossible filter
    /// - `StoreRead` if the store cannot be read
    pub async fn list(
        &self,
        identity: &Identity,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Transaction>, TransactionError> {
        if !identity.is_active_at(Utc::now()) {
            return Err(TransactionError::Unauthenticated);
        }
        validation::validate_filter(&filter)?;

        let (number, per_page) = (page.page, page.per_page);
        let (transactions, total) = self
            .store
            .list(identity.user_id, filter, page)
            .await
            .map_err(|e| TransactionError::StoreRead(e.to_string()))?;

        Ok(PageResponse::new(transactions, number, per_page, total))
    }

    /// Delete one of the caller's transactions.
    ///
    /// The quota counter is not decremented.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the identity is no longer active
    /// - `NotFound` if the caller has no transaction with this ID
    /// - `StoreWrite` if the store rejects the delete
    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<(), TransactionError> {
        if !identity.is_active_at(Utc::now()) {
            return Err(TransactionError::Unauthenticated);
        }

        let deleted = self
            .store
            .delete(identity.user_id, id)
            .await
            .map_err(|e| TransactionError::StoreWrite(e.to_string()))?;

        if !deleted {
            return Err(TransactionError::NotFound(id));
        }

        info!(user_id = %identity.user_id, transaction_id = %id, "Transaction deleted");
        Ok(())
    }
}
