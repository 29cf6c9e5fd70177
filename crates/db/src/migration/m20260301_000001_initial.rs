//! Initial database migration.
//!
//! Creates the bookkeeping schema: enums, chart of accounts, transactions
//! and their line items, invoices, and per-user settings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS & LINE ITEMS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: INVOICES
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;

        // ============================================================
        // PART 5: SETTINGS
        // ============================================================
        db.execute_unprepared(SETTINGS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE transaction_status AS ENUM ('draft', 'pending', 'approved', 'rejected');

CREATE TYPE transaction_type AS ENUM (
    'receipt',
    'payment',
    'journal',
    'transfer',
    'cash_receipt',
    'gcash',
    'bank_transfer',
    'check',
    'check_disbursement',
    'credit_card',
    'debit_card'
);

CREATE TYPE entry_type AS ENUM ('debit', 'credit');

CREATE TYPE invoice_status AS ENUM (
    'draft',
    'sent',
    'unpaid',
    'partially_paid',
    'paid',
    'overdue'
);
";

const ACCOUNTS_SQL: &str = r"
-- account_type stays free text: historical rows may carry aliases such as
-- 'Income' or 'Assets', normalized when reports are built.
CREATE TABLE accounts (
    id              UUID PRIMARY KEY,
    code            VARCHAR(50) NOT NULL UNIQUE,
    name            VARCHAR(255) NOT NULL,
    account_type    VARCHAR(50) NOT NULL,
    parent_id       UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    description     TEXT,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_accounts_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_accounts_parent ON accounts(parent_id);
CREATE INDEX idx_accounts_type ON accounts(account_type);
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id                  UUID PRIMARY KEY,
    reference           VARCHAR(100) NOT NULL UNIQUE,
    transaction_date    DATE NOT NULL,
    transaction_type    transaction_type NOT NULL,
    status              transaction_status NOT NULL DEFAULT 'draft',
    amount              NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
    description         VARCHAR(500),
    notes               TEXT,
    check_number        VARCHAR(50),
    check_date          DATE,
    bank                VARCHAR(100),
    payee               VARCHAR(255),
    attachment_path     VARCHAR(500),
    user_id             UUID NOT NULL,
    approved_by         UUID,
    approved_at         TIMESTAMPTZ,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transactions_date ON transactions(transaction_date DESC);
CREATE INDEX idx_transactions_status ON transactions(status);
CREATE INDEX idx_transactions_user ON transactions(user_id);
";

const TRANSACTION_ITEMS_SQL: &str = r"
CREATE TABLE transaction_items (
    id                      UUID PRIMARY KEY,
    transaction_id          UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    account_id              UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    entry_type              entry_type NOT NULL,
    amount                  NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
    description             VARCHAR(500),
    department_id           UUID,
    project_id              UUID,
    subsidiary_account_id   UUID,
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_transaction_items_transaction ON transaction_items(transaction_id);
CREATE INDEX idx_transaction_items_account ON transaction_items(account_id, created_at);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id                  UUID PRIMARY KEY,
    user_id             UUID NOT NULL,
    invoice_number      VARCHAR(50) NOT NULL UNIQUE,
    customer_name       VARCHAR(255) NOT NULL,
    customer_email      VARCHAR(255),
    customer_phone      VARCHAR(50),
    invoice_date        DATE NOT NULL,
    due_date            DATE NOT NULL,
    total_amount        NUMERIC(15, 2) NOT NULL DEFAULT 0,
    paid_amount         NUMERIC(15, 2) NOT NULL DEFAULT 0,
    status              invoice_status NOT NULL DEFAULT 'draft',
    notes               TEXT,
    transaction_id      UUID REFERENCES transactions(id) ON DELETE SET NULL,
    payment_count       INTEGER NOT NULL DEFAULT 0,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_invoices_due_after_issue CHECK (due_date >= invoice_date),
    CONSTRAINT chk_invoices_paid_within_total CHECK (paid_amount >= 0 AND paid_amount <= total_amount)
);

CREATE INDEX idx_invoices_user_date ON invoices(user_id, invoice_date DESC);
CREATE INDEX idx_invoices_status ON invoices(status);
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id              UUID PRIMARY KEY,
    invoice_id      UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    description     VARCHAR(500) NOT NULL,
    quantity        NUMERIC(12, 2) NOT NULL CHECK (quantity > 0),
    unit_price      NUMERIC(15, 2) NOT NULL CHECK (unit_price >= 0),
    amount          NUMERIC(15, 2) NOT NULL,
    account_id      UUID REFERENCES accounts(id) ON DELETE SET NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id);
";

const SETTINGS_SQL: &str = r"
CREATE TABLE settings (
    id          UUID PRIMARY KEY,
    user_id     UUID NOT NULL,
    key         VARCHAR(100) NOT NULL,
    value       TEXT,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_settings_user_key UNIQUE (user_id, key)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: touch_updated_at
-- Keeps updated_at current on every UPDATE
-- ============================================================
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = NOW();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_accounts_updated_at
BEFORE UPDATE ON accounts
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_transactions_updated_at
BEFORE UPDATE ON transactions
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_invoices_updated_at
BEFORE UPDATE ON invoices
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();

CREATE TRIGGER trg_settings_updated_at
BEFORE UPDATE ON settings
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_settings_updated_at ON settings;
DROP TRIGGER IF EXISTS trg_invoices_updated_at ON invoices;
DROP TRIGGER IF EXISTS trg_transactions_updated_at ON transactions;
DROP TRIGGER IF EXISTS trg_accounts_updated_at ON accounts;
DROP FUNCTION IF EXISTS touch_updated_at();

DROP TABLE IF EXISTS settings CASCADE;
DROP TABLE IF EXISTS invoice_items CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS transaction_items CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS entry_type;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS transaction_status;
";
