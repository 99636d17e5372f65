use crate::db::models::Item;
use crate::db::sqlite::ItemsStorage;
use crate::error::ListingError;
use crate::service::content_hasher::{hash_image_file, image_filename};
use axum::body::Bytes;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Where the bytes of a submitted image come from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file readable by the server process. Hashed for its name only.
    Path(PathBuf),
    /// Bytes uploaded with the request.
    Upload(Bytes),
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub image: ImageSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReceipt {
    pub id: i64,
    pub name: String,
    pub image_filename: String,
}

impl ItemReceipt {
    pub fn message(&self) -> String {
        format!("item received: {}", self.name)
    }
}

/// Orchestrates hashing, image storage and item persistence.
#[derive(Clone)]
pub struct ItemService {
    storage: ItemsStorage,
    images_dir: PathBuf,
}

impl ItemService {
    pub fn new(storage: ItemsStorage, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            images_dir: images_dir.into(),
        }
    }

    pub fn storage(&self) -> &ItemsStorage {
        &self.storage
    }

    pub async fn add_item(&self, item: NewItem) -> Result<ItemReceipt, ListingError> {
        // Only uploaded bytes are published; a server-side path is hashed and
        // never copied into the images directory.
        let filename = match item.image {
            ImageSource::Path(path) => hash_image_file(&path).await?,
            ImageSource::Upload(data) => {
                let filename = image_filename(&data);
                self.persist_image(&filename, &data).await?;
                filename
            }
        };

        let id = self
            .storage
            .create(&item.name, &item.category, &filename)
            .await?;

        info!(id, name = %item.name, category = %item.category, image = %filename, "item received");
        Ok(ItemReceipt {
            id,
            name: item.name,
            image_filename: filename,
        })
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, ListingError> {
        let rows = self.storage.list_all().await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Zero or one item.
    pub async fn get_item(&self, id: i64) -> Result<Vec<Item>, ListingError> {
        let row = self.storage.get_by_id(id).await?;
        Ok(row.into_iter().map(Item::from).collect())
    }

    pub async fn search_items(&self, keyword: &str) -> Result<Vec<Item>, ListingError> {
        let rows = self.storage.find_by_name(keyword).await?;
        Ok(rows.into_iter().map(Item::from).collect())
    }

    /// Content-addressed write: an existing file with the same name already
    /// holds these bytes and is left alone.
    async fn persist_image(&self, filename: &str, data: &[u8]) -> Result<(), ListingError> {
        let target = self.images_dir.join(filename);
        if tokio::fs::try_exists(&target).await.unwrap_or(false) {
            debug!(path = %target.display(), "image already stored");
            return Ok(());
        }

        let staging = self.staging_path(filename);
        tokio::fs::write(&staging, data).await?;
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        debug!(path = %target.display(), bytes = data.len(), "image stored");
        Ok(())
    }

    fn staging_path(&self, filename: &str) -> PathBuf {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        self.images_dir
            .join(format!(".{filename}.{}.{seq}.tmp", std::process::id()))
    }
}
