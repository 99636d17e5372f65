use crate::error::ListingError;
use sha2::{Digest, Sha256};
use std::path::Path;

pub const IMAGE_SUFFIX: &str = ".jpg";

/// Content-addressed filename: lowercase hex SHA-256 of `data` plus `.jpg`.
pub fn image_filename(data: &[u8]) -> String {
    format!("{:x}{IMAGE_SUFFIX}", Sha256::digest(data))
}

/// Read `path` and derive its filename.
pub async fn hash_image_file(path: &Path) -> Result<String, ListingError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| ListingError::ImageSource {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(image_filename(&data))
}
