//! Dimensions and accounting periods.
//!
//! Adds departments, projects, subsidiary accounts and periods, and turns
//! the dimension columns of `transaction_items` into foreign keys.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(DIMENSIONS_SQL).await?;
        db.execute_unprepared(PERIODS_SQL).await?;
        db.execute_unprepared(ITEM_FOREIGN_KEYS_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE dimension_status AS ENUM ('active', 'inactive');

CREATE TYPE project_status AS ENUM ('planning', 'active', 'paused', 'completed', 'cancelled');

CREATE TYPE subsidiary_type AS ENUM (
    'cost_center',
    'profit_center',
    'branch',
    'division',
    'custom'
);

CREATE TYPE period_status AS ENUM ('open', 'closed', 'locked');
";

const DIMENSIONS_SQL: &str = r"
CREATE TABLE departments (
    id              UUID PRIMARY KEY,
    code            VARCHAR(50) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    manager_name    VARCHAR(255),
    budget          NUMERIC(15, 2) CHECK (budget >= 0),
    status          dimension_status NOT NULL DEFAULT 'active',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE projects (
    id              UUID PRIMARY KEY,
    code            VARCHAR(50) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    department_id   UUID REFERENCES departments(id) ON DELETE SET NULL,
    project_manager VARCHAR(255),
    start_date      DATE,
    end_date        DATE,
    budget          NUMERIC(15, 2) CHECK (budget >= 0),
    status          project_status NOT NULL DEFAULT 'active',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_projects_dates CHECK (end_date IS NULL OR start_date IS NULL OR end_date >= start_date)
);

CREATE INDEX idx_projects_department ON projects(department_id);
CREATE INDEX idx_projects_status ON projects(status);

CREATE TABLE subsidiary_accounts (
    id              UUID PRIMARY KEY,
    account_id      UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    code            VARCHAR(50) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    subsidiary_type subsidiary_type NOT NULL DEFAULT 'cost_center',
    status          dimension_status NOT NULL DEFAULT 'active',
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_subsidiary_accounts_account ON subsidiary_accounts(account_id);
";

const PERIODS_SQL: &str = r"
CREATE TABLE periods (
    id              UUID PRIMARY KEY,
    name            VARCHAR(100) NOT NULL UNIQUE,
    start_date      DATE NOT NULL,
    end_date        DATE NOT NULL,
    status          period_status NOT NULL DEFAULT 'open',
    notes           TEXT,
    closed_at       TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_periods_dates CHECK (end_date >= start_date)
);

CREATE INDEX idx_periods_dates ON periods(start_date, end_date);
";

const ITEM_FOREIGN_KEYS_SQL: &str = r"
ALTER TABLE transaction_items
    ADD CONSTRAINT fk_transaction_items_department
        FOREIGN KEY (department_id) REFERENCES departments(id) ON DELETE RESTRICT,
    ADD CONSTRAINT fk_transaction_items_project
        FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE RESTRICT,
    ADD CONSTRAINT fk_transaction_items_subsidiary_account
        FOREIGN KEY (subsidiary_account_id) REFERENCES subsidiary_accounts(id) ON DELETE RESTRICT;
";

const TRIGGERS_SQL: &str = r"
CREATE TRIGGER trg_departments_updated_at
BEFORE UPDATE ON departments
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_projects_updated_at
BEFORE UPDATE ON projects
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_subsidiary_accounts_updated_at
BEFORE UPDATE ON subsidiary_accounts
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_periods_updated_at
BEFORE UPDATE ON periods
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
ALTER TABLE transaction_items
    DROP CONSTRAINT IF EXISTS fk_transaction_items_subsidiary_account,
    DROP CONSTRAINT IF EXISTS fk_transaction_items_project,
    DROP CONSTRAINT IF EXISTS fk_transaction_items_department;

DROP TABLE IF EXISTS periods CASCADE;
DROP TABLE IF EXISTS subsidiary_accounts CASCADE;
DROP TABLE IF EXISTS projects CASCADE;
DROP TABLE IF EXISTS departments CASCADE;

DROP TYPE IF EXISTS period_status;
DROP TYPE IF EXISTS subsidiary_type;
DROP TYPE IF EXISTS project_status;
DROP TYPE IF EXISTS dimension_status;
";
