use crate::db::models::{DbCategory, DbItem};
use crate::db::schema::SQLITE_INIT;
use crate::error::ListingError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub type SqlitePool = Pool<Sqlite>;

const SELECT_ITEMS: &str = r#"SELECT items.id, items.name, category.name AS category, items.image_filename
    FROM items JOIN category ON category.id = items.category_id"#;

/// Open a pool for `database_url`, creating the database file when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool, ListingError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    Ok(pool)
}

#[derive(Clone)]
pub struct ItemsStorage {
    pool: SqlitePool,
}

impl ItemsStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ListingError> {
        // sqlx::query runs one statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// All items in insertion order.
    pub async fn list_all(&self) -> Result<Vec<DbItem>, ListingError> {
        let rows = sqlx::query_as::<_, DbItem>(&format!("{SELECT_ITEMS} ORDER BY items.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<DbItem>, ListingError> {
        let row = sqlx::query_as::<_, DbItem>(&format!("{SELECT_ITEMS} WHERE items.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Exact, case-sensitive name match (SQLite `BINARY` collation).
    pub async fn find_by_name(&self, keyword: &str) -> Result<Vec<DbItem>, ListingError> {
        let rows = sqlx::query_as::<_, DbItem>(&format!(
            "{SELECT_ITEMS} WHERE items.name = ? ORDER BY items.id"
        ))
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Get-or-create the category, then insert the item, in one transaction.
    /// Returns the new item id.
    pub async fn create(
        &self,
        name: &str,
        category: &str,
        image_filename: &str,
    ) -> Result<i64, ListingError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO category (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(category)
            .execute(&mut *tx)
            .await?;

        let (category_id,): (i64,) = sqlx::query_as("SELECT id FROM category WHERE name = ?")
            .bind(category)
            .fetch_one(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO items (name, category_id, image_filename) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(category_id)
        .bind(image_filename)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(inserted.last_insert_rowid())
    }

    pub async fn list_categories(&self) -> Result<Vec<DbCategory>, ListingError> {
        let rows = sqlx::query_as::<_, DbCategory>("SELECT id, name FROM category ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
