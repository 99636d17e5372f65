//! SQL DDL for the item listing tables.

/// SQLite schema:
/// - `category.name` is UNIQUE so get-or-create is race free
/// - `items.category_id` references `category(id)` (foreign keys are on by default in sqlx)
/// - index on `items.name` serves the exact-match search
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS category (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    category_id INTEGER NOT NULL REFERENCES category(id),
    image_filename TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_name ON items(name);
"#;
