//! SQLite schema definition.

/// Complete database schema for the storefront profile.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Preferences (local key-value store, one row per persisted key)
-- ============================================================================

CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Product Catalog
-- ============================================================================

CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    brand TEXT NOT NULL DEFAULT '',
    active_ingredient TEXT NOT NULL,
    category TEXT NOT NULL,
    price REAL NOT NULL CHECK (price >= 0),
    description TEXT NOT NULL DEFAULT '',
    image TEXT NOT NULL DEFAULT '',
    stock INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    requires_prescription INTEGER NOT NULL DEFAULT 0,
    expiry_date TEXT NOT NULL DEFAULT '',
    batch_number TEXT NOT NULL DEFAULT '',
    rating REAL NOT NULL DEFAULT 0,
    contraindications TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    dosage_guidelines TEXT,
    side_effects TEXT NOT NULL DEFAULT '[]',       -- JSON array of strings
    recall_status TEXT,                            -- JSON object {isRecalled, reason, date}
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_products_ingredient ON products(active_ingredient);
CREATE INDEX IF NOT EXISTS idx_products_stock ON products(stock);
"#;
