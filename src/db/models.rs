use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An `items` row joined with its category name.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbItem {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_filename: String,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbCategory {
    pub id: i64,
    pub name: String,
}

/// External item representation returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
    pub category: String,
    pub image_filename: String,
}

impl From<DbItem> for Item {
    fn from(d: DbItem) -> Self {
        Item {
            name: d.name,
            category: d.category,
            image_filename: d.image_filename,
        }
    }
}
