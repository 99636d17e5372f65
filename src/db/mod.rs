//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: row structs and the external `Item` shape
//! - `schema.rs`: SQL DDL for initializing the database
//! - `sqlite.rs`: `ItemsStorage`, the query layer over the pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{DbCategory, DbItem, Item};
pub use schema::SQLITE_INIT;
pub use sqlite::{ItemsStorage, SqlitePool, connect};
