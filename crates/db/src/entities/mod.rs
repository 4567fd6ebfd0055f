//! `SeaORM` entity definitions.

pub mod prelude;

pub mod categories;
pub mod plan_limits;
pub mod profiles;
pub mod sea_orm_active_enums;
pub mod transactions;
