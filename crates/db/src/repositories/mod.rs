//! Repository implementations of the `finora-core` store traits.
//!
//! Every call runs in its own [`RlsConnection`](crate::rls::RlsConnection)
//! scoped to the user it reads or writes for.

pub mod category;
pub mod plan_limit;
pub mod profile;
pub mod transaction;

pub use category::CategoryRepository;
pub use plan_limit::PlanLimitRepository;
pub use profile::ProfileRepository;
pub use transaction::TransactionRepository;

use finora_core::StoreError;
use sea_orm::{DbErr, SqlErr};

use crate::entities::sea_orm_active_enums::TransactionKind as DbTransactionKind;
use finora_core::transaction::TransactionKind;

/// Maps a failed read.
pub(crate) fn read_error(err: DbErr) -> StoreError {
    StoreError::Read(err.to_string())
}

/// Maps a failed write, singling out uniqueness violations.
pub(crate) fn write_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
        _ => StoreError::Write(err.to_string()),
    }
}

pub(crate) const fn to_db_kind(kind: TransactionKind) -> DbTransactionKind {
    match kind {
        TransactionKind::Income => DbTransactionKind::Entrada,
        TransactionKind::Expense => DbTransactionKind::Saida,
    }
}

pub(crate) const fn from_db_kind(kind: DbTransactionKind) -> TransactionKind {
    match kind {
        DbTransactionKind::Entrada => TransactionKind::Income,
        DbTransactionKind::Saida => TransactionKind::Expense,
    }
}
