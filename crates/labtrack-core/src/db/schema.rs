//! SQLite schema definition.

/// Complete database schema for labtrack.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Persons (clients and staff)
-- ============================================================================

CREATE TABLE IF NOT EXISTS persons (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    surname TEXT NOT NULL DEFAULT '',
    sex TEXT NOT NULL CHECK (sex IN ('masculino', 'femenino')),
    birth_date TEXT,                              -- ISO date; NULL on placeholders
    phone TEXT NOT NULL DEFAULT '',
    role TEXT NOT NULL CHECK (role IN ('cliente', 'personal')),
    specialty TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_persons_role ON persons(role);
CREATE INDEX IF NOT EXISTS idx_persons_sex ON persons(sex);

-- ============================================================================
-- Categories
-- ============================================================================

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- ============================================================================
-- Lab Tests
-- ============================================================================

CREATE TABLE IF NOT EXISTS lab_tests (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    requested_date TEXT NOT NULL,                 -- ISO date
    delivery_date TEXT NOT NULL,                  -- ISO date
    status TEXT NOT NULL,
    observations TEXT,
    rating INTEGER NOT NULL,
    category_id INTEGER REFERENCES categories(id),
    client_id INTEGER NOT NULL REFERENCES persons(id),
    staff_id INTEGER NOT NULL REFERENCES persons(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (delivery_date >= requested_date)
);

CREATE INDEX IF NOT EXISTS idx_tests_requested ON lab_tests(requested_date);
CREATE INDEX IF NOT EXISTS idx_tests_name ON lab_tests(name);
CREATE INDEX IF NOT EXISTS idx_tests_client ON lab_tests(client_id);
CREATE INDEX IF NOT EXISTS idx_tests_staff ON lab_tests(staff_id);

-- ============================================================================
-- Lab Results (one per test, synthesized at load time)
-- ============================================================================

CREATE TABLE IF NOT EXISTS lab_results (
    id INTEGER PRIMARY KEY,
    test_id INTEGER NOT NULL UNIQUE REFERENCES lab_tests(id),
    result TEXT NOT NULL,
    date TEXT NOT NULL,                           -- ISO date
    observations TEXT,
    interpretation TEXT NOT NULL,
    details TEXT NOT NULL,
    image_path TEXT
);
"#;
