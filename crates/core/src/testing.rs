//! In-memory stores and a scripted payment provider for workflow tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::{DateTime, Duration, Utc};
use finora_shared::Identity;
use finora_shared::types::PageRequest;
use uuid::Uuid;

use crate::billing::{
    CheckoutLink, CheckoutRequest, CheckoutSessionInfo, PaymentIntentInfo, PaymentProvider,
    ProviderError,
};
use crate::category::{Category, CategoryDraft, CategoryStore};
use crate::plan::{Period, PlanTier, ProfileStore, UserProfile};
use crate::quota::{PlanLimitRecord, PlanLimitStore};
use crate::store::StoreError;
use crate::transaction::{
    Transaction, TransactionDraft, TransactionFilter, TransactionKind, TransactionStore,
};

/// Identity of a fresh user whose session is valid for an hour.
pub fn active_identity() -> Identity {
    Identity::new(
        Uuid::new_v4(),
        Some("ana@example.com".to_string()),
        Utc::now() + Duration::hours(1),
    )
}

/// Identity valid for an hour after `now`.
pub fn identity_at(now: DateTime<Utc>) -> Identity {
    Identity::new(
        Uuid::new_v4(),
        Some("ana@example.com".to_string()),
        now + Duration::hours(1),
    )
}

#[derive(Default)]
pub struct MemoryPlanLimitStore {
    records: Mutex<HashMap<(Uuid, Period), PlanLimitRecord>>,
    fail_reads: AtomicBool,
    fail_increments: AtomicBool,
    fail_flag_updates: AtomicBool,
    flag_updates: AtomicUsize,
}

impl MemoryPlanLimitStore {
    pub fn seed(&self, record: PlanLimitRecord) {
        self.records
            .lock()
            .unwrap()
            .insert((record.user_id, record.period), record);
    }

    pub fn record(&self, user_id: Uuid, period: Period) -> Option<PlanLimitRecord> {
        self.records.lock().unwrap().get(&(user_id, period)).cloned()
    }

    pub fn count(&self, user_id: Uuid, period: Period) -> u32 {
        self.record(user_id, period)
            .map_or(0, |r| r.transaction_count)
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_increments(&self) {
        self.fail_increments.store(true, Ordering::SeqCst);
    }

    pub fn fail_flag_updates(&self) {
        self.fail_flag_updates.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.fail_reads.store(false, Ordering::SeqCst);
        self.fail_increments.store(false, Ordering::SeqCst);
        self.fail_flag_updates.store(false, Ordering::SeqCst);
    }

    pub fn flag_updates(&self) -> usize {
        self.flag_updates.load(Ordering::SeqCst)
    }
}

impl PlanLimitStore for MemoryPlanLimitStore {
    async fn find(
        &self,
        user_id: Uuid,
        period: Period,
    ) -> Result<Option<PlanLimitRecord>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read("connection reset".to_string()));
        }
        Ok(self.record(user_id, period))
    }

    async fn increment(&self, user_id: Uuid, period: Period) -> Result<PlanLimitRecord, StoreError> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(StoreError::Write("connection reset".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry((user_id, period))
            .and_modify(|r| r.transaction_count += 1)
            .or_insert(PlanLimitRecord {
                user_id,
                period,
                transaction_count: 1,
                limit_reached: false,
            });
        Ok(record.clone())
    }

    async fn raise_count(
        &self,
        user_id: Uuid,
        period: Period,
        count: u32,
    ) -> Result<PlanLimitRecord, StoreError> {
        if self.fail_increments.load(Ordering::SeqCst) {
            return Err(StoreError::Write("connection reset".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry((user_id, period))
            .and_modify(|r| r.transaction_count = r.transaction_count.max(count))
            .or_insert(PlanLimitRecord {
                user_id,
                period,
                transaction_count: count,
                limit_reached: false,
            });
        Ok(record.clone())
    }

    async fn set_limit_reached(
        &self,
        user_id: Uuid,
        period: Period,
        reached: bool,
    ) -> Result<(), StoreError> {
        self.flag_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_flag_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Write("permission denied".to_string()));
        }
        if let Some(record) = self.records.lock().unwrap().get_mut(&(user_id, period)) {
            record.limit_reached = reached;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<Uuid, UserProfile>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryProfileStore {
    pub fn seed(&self, profile: UserProfile) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }

    pub fn profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.profiles.lock().unwrap().get(&user_id).cloned()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn find(&self, user_id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.profile(user_id))
    }

    async fn set_plan(
        &self,
        user_id: Uuid,
        plan: PlanTier,
        subscription_end: Option<DateTime<Utc>>,
    ) -> Result<UserProfile, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("profiles is read-only".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .entry(user_id)
            .or_insert_with(|| UserProfile::free(user_id));
        profile.plan = plan;
        profile.subscription_end = subscription_end;
        Ok(profile.clone())
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    rows: Mutex<Vec<Transaction>>,
    fail_writes: AtomicBool,
    clock: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryTransactionStore {
    pub fn rows(&self) -> Vec<Transaction> {
        self.rows.lock().unwrap().clone()
    }

    /// Stamp rows inserted from now on with `at` instead of the wall clock.
    pub fn set_clock(&self, at: DateTime<Utc>) {
        *self.clock.lock().unwrap() = Some(at);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }
}

impl TransactionStore for MemoryTransactionStore {
    async fn insert(&self, draft: TransactionDraft) -> Result<Transaction, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write(
                "new row violates check constraint".to_string(),
            ));
        }
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            date: draft.date,
            value: draft.value,
            category: draft.category,
            description: draft.description,
            kind: draft.kind,
            created_at: self.clock.lock().unwrap().unwrap_or_else(Utc::now),
        };
        self.rows.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }

    async fn list(
        &self,
        user_id: Uuid,
        filter: TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<Transaction>, u64), StoreError> {
        let mut rows: Vec<Transaction> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));

        let total = rows.len() as u64;
        let page_rows = rows
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap())
            .take(usize::try_from(page.limit()).unwrap())
            .collect();
        Ok((page_rows, total))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.user_id == user_id));
        Ok(rows.len() != before)
    }

    async fn count_created(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id && t.created_at >= from && t.created_at < to)
            .count() as u64)
    }
}

#[derive(Default)]
pub struct MemoryCategoryStore {
    rows: Mutex<Vec<Category>>,
}

impl CategoryStore for MemoryCategoryStore {
    async fn list(
        &self,
        user_id: Uuid,
        kind: Option<TransactionKind>,
    ) -> Result<Vec<Category>, StoreError> {
        let mut rows: Vec<Category> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id && kind.is_none_or(|k| k == c.kind))
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.name.to_lowercase());
        Ok(rows)
    }

    async fn insert(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let key = draft.unique_key();
        if rows
            .iter()
            .any(|c| (c.user_id, c.kind, c.name.to_lowercase()) == key)
        {
            return Err(StoreError::Conflict(
                "categories_user_kind_name_key".to_string(),
            ));
        }
        let category = Category {
            id: Uuid::new_v4(),
            user_id: draft.user_id,
            name: draft.name,
            kind: draft.kind,
            created_at: Utc::now(),
        };
        rows.push(category.clone());
        Ok(category)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(rows.len() != before)
    }
}

/// Payment provider answering from scripted data.
#[derive(Default)]
pub struct MockPaymentProvider {
    sessions: Mutex<HashMap<String, CheckoutSessionInfo>>,
    customers: Mutex<HashMap<String, String>>,
    payments: Mutex<HashMap<String, Vec<PaymentIntentInfo>>>,
    checkouts: Mutex<Vec<CheckoutRequest>>,
    unavailable: AtomicBool,
}

impl MockPaymentProvider {
    pub fn with_session(self, id: &str, user_id: Uuid, payment_status: &str) -> Self {
        self.sessions.lock().unwrap().insert(
            id.to_string(),
            CheckoutSessionInfo {
                id: id.to_string(),
                client_reference_id: Some(user_id.to_string()),
                metadata_user_id: Some(user_id.to_string()),
                payment_status: payment_status.to_string(),
            },
        );
        self
    }

    pub fn with_customer(self, email: &str, customer_id: &str) -> Self {
        self.customers
            .lock()
            .unwrap()
            .insert(email.to_string(), customer_id.to_string());
        self
    }

    pub fn with_payment(
        self,
        customer_id: &str,
        status: &str,
        amount: i64,
        created: DateTime<Utc>,
    ) -> Self {
        let mut payments = self.payments.lock().unwrap();
        let list = payments.entry(customer_id.to_string()).or_default();
        let id = format!("pi_{}", list.len() + 1);
        list.push(PaymentIntentInfo {
            id,
            status: status.to_string(),
            amount,
            created,
        });
        drop(payments);
        self
    }

    pub fn unavailable(self) -> Self {
        self.unavailable.store(true, Ordering::SeqCst);
        self
    }

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.checkouts.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), ProviderError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ProviderError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl PaymentProvider for MockPaymentProvider {
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionInfo, ProviderError> {
        self.check_available()?;
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| ProviderError::Api {
                status: 404,
                message: format!("No such checkout.session: '{session_id}'"),
            })
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<Option<String>, ProviderError> {
        self.check_available()?;
        Ok(self.customers.lock().unwrap().get(email).cloned())
    }

    async fn list_payment_intents(
        &self,
        customer_id: &str,
        limit: u8,
    ) -> Result<Vec<PaymentIntentInfo>, ProviderError> {
        self.check_available()?;
        let mut list = self
            .payments
            .lock()
            .unwrap()
            .get(customer_id)
            .cloned()
            .unwrap_or_default();
        list.sort_by(|a, b| b.created.cmp(&a.created));
        list.truncate(usize::from(limit));
        Ok(list)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutLink, ProviderError> {
        self.check_available()?;
        self.checkouts.lock().unwrap().push(request.clone());
        Ok(CheckoutLink {
            id: "cs_test_new".to_string(),
            url: "https://checkout.stripe.test/c/pay/cs_test_new".to_string(),
        })
    }
}
