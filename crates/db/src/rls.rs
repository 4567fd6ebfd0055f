//! Row-Level Security (RLS) context management.
//!
//! Every table is guarded by a policy on `app.current_user_id`. Store calls run
//! inside a transaction that sets it first:
//!
//! ```ignore
//! use finora_db::rls::RlsConnection;
//!
//! let rls = RlsConnection::new(&db, user_id).await?;
//! let rows = Transactions::find().all(rls.transaction()).await?;
//! rls.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use uuid::Uuid;

/// A database transaction scoped to one user by RLS.
///
/// Dropping it without [`commit`](Self::commit) rolls back.
pub struct RlsConnection {
    txn: DatabaseTransaction,
}

impl RlsConnection {
    /// Begins a transaction and sets `app.current_user_id` with `SET LOCAL`,
    /// so the setting ends with the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the context
    /// cannot be set.
    pub async fn new(db: &DatabaseConnection, user_id: Uuid) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        txn.execute_unprepared(&context_sql(user_id)).await?;
        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

/// `Uuid` renders as hex and hyphens only, so interpolation cannot inject SQL.
fn context_sql(user_id: Uuid) -> String {
    format!("SET LOCAL app.current_user_id = '{user_id}'")
}
