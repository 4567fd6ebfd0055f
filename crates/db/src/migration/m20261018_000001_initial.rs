//! Initial database migration.
//!
//! Creates the enums, the profile, transaction, plan limit and category tables,
//! and the per-user row-level security policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(PROFILES_SQL).await?;
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(PLAN_LIMITS_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE transaction_kind AS ENUM ('entrada', 'saida');
CREATE TYPE plan_tier AS ENUM ('free', 'premium', 'master');
";

const PROFILES_SQL: &str = r"
-- ============================================================
-- PROFILES
-- One row per auth provider user; single source of truth for plan tier.
-- ============================================================
CREATE TABLE profiles (
    id UUID PRIMARY KEY,
    name VARCHAR(255),
    plan plan_tier NOT NULL DEFAULT 'free',
    subscription_end TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const TRANSACTIONS_SQL: &str = r"
-- ============================================================
-- TRANSACTIONS
-- ============================================================
CREATE TABLE transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    date DATE NOT NULL,
    value NUMERIC NOT NULL CHECK (value >= 0),
    category VARCHAR(100) NOT NULL CHECK (length(btrim(category)) > 0),
    description TEXT,
    type transaction_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_transactions_user_date ON transactions (user_id, date DESC, created_at DESC);
";

const PLAN_LIMITS_SQL: &str = r"
-- ============================================================
-- PLAN LIMITS
-- Monthly transaction counter per user; incremented with a single upsert.
-- ============================================================
CREATE TABLE plan_limits (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    year INTEGER NOT NULL,
    transaction_count INTEGER NOT NULL DEFAULT 0 CHECK (transaction_count >= 0),
    limit_reached BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT plan_limits_user_period_key UNIQUE (user_id, month, year)
);
";

const CATEGORIES_SQL: &str = r"
-- ============================================================
-- CATEGORIES
-- ============================================================
CREATE TABLE categories (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    name VARCHAR(60) NOT NULL CHECK (length(btrim(name)) > 0),
    type transaction_kind NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX categories_user_kind_name_key ON categories (user_id, type, lower(name));
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Application sets context per transaction: SET LOCAL app.current_user_id = 'user-uuid';
-- ============================================================

ALTER TABLE profiles ENABLE ROW LEVEL SECURITY;
ALTER TABLE transactions ENABLE ROW LEVEL SECURITY;
ALTER TABLE plan_limits ENABLE ROW LEVEL SECURITY;
ALTER TABLE categories ENABLE ROW LEVEL SECURITY;

CREATE POLICY owner_isolation ON profiles
    USING (id = current_setting('app.current_user_id', true)::UUID);

CREATE POLICY owner_isolation ON transactions
    USING (user_id = current_setting('app.current_user_id', true)::UUID);

CREATE POLICY owner_isolation ON plan_limits
    USING (user_id = current_setting('app.current_user_id', true)::UUID);

CREATE POLICY owner_isolation ON categories
    USING (user_id = current_setting('app.current_user_id', true)::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS plan_limits CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS profiles CASCADE;
DROP TYPE IF EXISTS plan_tier;
DROP TYPE IF EXISTS transaction_kind;
";
