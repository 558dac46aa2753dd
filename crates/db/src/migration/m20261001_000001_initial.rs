//! Initial database migration.
//!
//! Creates the billing schema: enums, parties, catalog, transactions,
//! invoices and payments, plus the `updated_at` trigger.

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
        // PART 2: PARTIES & CATALOG
        // ============================================================
        db.execute_unprepared(PARTIES_SQL).await?;
        db.execute_unprepared(CATEGORIES_SQL).await?;
        db.execute_unprepared(ITEMS_SQL).await?;

        // ============================================================
        // PART 3: TRANSACTIONS
        // ============================================================
        db.execute_unprepared(TRANSACTIONS_SQL).await?;
        db.execute_unprepared(TRANSACTION_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: INVOICES & PAYMENTS
        // ============================================================
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(INVOICE_ITEMS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
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
CREATE TYPE party_type AS ENUM ('CUSTOMER', 'SUPPLIER', 'VENDOR');

CREATE TYPE transaction_type AS ENUM ('SALE', 'PURCHASE');

CREATE TYPE invoice_status AS ENUM (
    'DRAFT',
    'SENT',
    'PAID',
    'OVERDUE',
    'CANCELLED'
);

CREATE TYPE payment_method AS ENUM (
    'CASH',
    'CARD',
    'UPI',
    'BANK_TRANSFER',
    'CHEQUE',
    'OTHER'
);

CREATE TYPE payment_status AS ENUM (
    'PENDING',
    'COMPLETED',
    'FAILED',
    'REFUNDED'
);
";

const PARTIES_SQL: &str = r"
CREATE TABLE parties (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    party_type party_type NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(32),
    gstin VARCHAR(15),
    address TEXT,
    city VARCHAR(100),
    state VARCHAR(100),
    country VARCHAR(100),
    pincode VARCHAR(10),
    credit_limit NUMERIC(14, 2) NOT NULL DEFAULT 0,
    payment_terms INTEGER NOT NULL DEFAULT 30,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_party_credit_limit CHECK (credit_limit >= 0),
    CONSTRAINT chk_party_payment_terms CHECK (payment_terms >= 0)
);

CREATE INDEX idx_parties_type ON parties(party_type) WHERE is_active = true;
CREATE INDEX idx_parties_name ON parties(lower(name));
";

const CATEGORIES_SQL: &str = r"
CREATE TABLE categories (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    parent_id UUID REFERENCES categories(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_category_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_categories_parent ON categories(parent_id);
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    sku VARCHAR(64) NOT NULL,
    description TEXT,
    category_id UUID REFERENCES categories(id) ON DELETE RESTRICT,
    unit VARCHAR(32) NOT NULL DEFAULT 'pcs',
    hsn_code VARCHAR(8),
    unit_price NUMERIC(14, 2) NOT NULL DEFAULT 0,
    cost_price NUMERIC(14, 2) NOT NULL DEFAULT 0,
    stock_quantity NUMERIC(12, 3) NOT NULL DEFAULT 0,
    min_stock_level NUMERIC(12, 3) NOT NULL DEFAULT 0,
    gst_rate NUMERIC(5, 2) NOT NULL DEFAULT 18,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_items_sku UNIQUE (sku),
    CONSTRAINT chk_item_prices CHECK (unit_price >= 0 AND cost_price >= 0),
    CONSTRAINT chk_item_stock CHECK (stock_quantity >= 0 AND min_stock_level >= 0),
    CONSTRAINT chk_item_gst_rate CHECK (gst_rate >= 0 AND gst_rate <= 100)
);

CREATE INDEX idx_items_category ON items(category_id);
CREATE INDEX idx_items_low_stock ON items(stock_quantity, min_stock_level) WHERE is_active = true;
";

const TRANSACTIONS_SQL: &str = r"
CREATE TABLE transactions (
    id UUID PRIMARY KEY,
    transaction_number VARCHAR(32) NOT NULL,
    transaction_type transaction_type NOT NULL,
    customer_id UUID REFERENCES parties(id) ON DELETE RESTRICT,
    supplier_id UUID REFERENCES parties(id) ON DELETE RESTRICT,
    transaction_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    subtotal NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    discount_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_transactions_number UNIQUE (transaction_number)
);

CREATE INDEX idx_transactions_type_date ON transactions(transaction_type, transaction_date DESC);
CREATE INDEX idx_transactions_customer ON transactions(customer_id) WHERE customer_id IS NOT NULL;
CREATE INDEX idx_transactions_supplier ON transactions(supplier_id) WHERE supplier_id IS NOT NULL;
";

const TRANSACTION_ITEMS_SQL: &str = r"
CREATE TABLE transaction_items (
    id UUID PRIMARY KEY,
    transaction_id UUID NOT NULL REFERENCES transactions(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id) ON DELETE RESTRICT,
    quantity NUMERIC(12, 3) NOT NULL,
    unit_price NUMERIC(14, 2) NOT NULL,
    discount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(5, 2) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    line_total NUMERIC(14, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_transaction_item_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_transaction_items_transaction ON transaction_items(transaction_id);
CREATE INDEX idx_transaction_items_item ON transaction_items(item_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY,
    invoice_number VARCHAR(32) NOT NULL,
    transaction_id UUID REFERENCES transactions(id) ON DELETE RESTRICT,
    party_id UUID REFERENCES parties(id) ON DELETE RESTRICT,
    status invoice_status NOT NULL DEFAULT 'DRAFT',
    issue_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    due_date TIMESTAMPTZ NOT NULL,
    sent_date TIMESTAMPTZ,
    subtotal NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    cgst_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    sgst_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    igst_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    discount_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    paid_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    balance_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_invoices_number UNIQUE (invoice_number),
    CONSTRAINT chk_invoice_due_after_issue CHECK (due_date >= issue_date)
);

-- At most one invoice per transaction
CREATE UNIQUE INDEX uq_invoices_transaction ON invoices(transaction_id) WHERE transaction_id IS NOT NULL;

CREATE INDEX idx_invoices_status ON invoices(status);
CREATE INDEX idx_invoices_party ON invoices(party_id) WHERE party_id IS NOT NULL;
CREATE INDEX idx_invoices_due ON invoices(due_date) WHERE status IN ('SENT', 'OVERDUE');
";

const INVOICE_ITEMS_SQL: &str = r"
CREATE TABLE invoice_items (
    id UUID PRIMARY KEY,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    item_id UUID NOT NULL REFERENCES items(id) ON DELETE RESTRICT,
    description TEXT NOT NULL,
    quantity NUMERIC(12, 3) NOT NULL,
    unit_price NUMERIC(14, 2) NOT NULL,
    discount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_rate NUMERIC(5, 2) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    line_total NUMERIC(14, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_invoice_item_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id);
CREATE INDEX idx_invoice_items_item ON invoice_items(item_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    payment_number VARCHAR(32) NOT NULL,
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE RESTRICT,
    amount NUMERIC(14, 2) NOT NULL,
    payment_method payment_method NOT NULL,
    reference VARCHAR(255),
    payment_date TIMESTAMPTZ NOT NULL DEFAULT now(),
    status payment_status NOT NULL DEFAULT 'COMPLETED',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_payments_number UNIQUE (payment_number)
);

CREATE INDEX idx_payments_invoice ON payments(invoice_id);
CREATE INDEX idx_payments_date ON payments(payment_date) WHERE status = 'COMPLETED';
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_parties_updated_at BEFORE UPDATE ON parties
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_categories_updated_at BEFORE UPDATE ON categories
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_items_updated_at BEFORE UPDATE ON items
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
CREATE TRIGGER trg_transactions_updated_at BEFORE UPDATE ON transactions
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS invoice_items CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS transaction_items CASCADE;
DROP TABLE IF EXISTS transactions CASCADE;
DROP TABLE IF EXISTS items CASCADE;
DROP TABLE IF EXISTS categories CASCADE;
DROP TABLE IF EXISTS parties CASCADE;

DROP FUNCTION IF EXISTS set_updated_at() CASCADE;

DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS transaction_type;
DROP TYPE IF EXISTS party_type;
";
