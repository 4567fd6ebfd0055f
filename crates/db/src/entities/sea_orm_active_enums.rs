//! `SeaORM` active enums mapped to PostgreSQL enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `transaction_kind` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_kind")]
pub enum TransactionKind {
    /// Income.
    #[sea_orm(string_value = "entrada")]
    Entrada,
    /// Expense.
    #[sea_orm(string_value = "saida")]
    Saida,
}

/// `plan_tier` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "plan_tier")]
pub enum PlanTier {
    /// Free tier.
    #[sea_orm(string_value = "free")]
    Free,
    /// Paid tier.
    #[sea_orm(string_value = "premium")]
    Premium,
    /// Manually granted tier.
    #[sea_orm(string_value = "master")]
    Master,
}
