use crate::error::ListingError;
use crate::service::content_hasher::IMAGE_SUFFIX;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

pub const DEFAULT_IMAGE: &str = "default.jpg";

/// Maps requested image filenames onto the images directory, falling back to
/// `default.jpg` when the file is absent.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    images_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    pub path: PathBuf,
    /// `true` when the requested file was missing and the default is served.
    pub defaulted: bool,
}

#[derive(Debug)]
pub struct ServedImage {
    pub bytes: Vec<u8>,
    pub defaulted: bool,
}

impl ImageResolver {
    /// Fails when `<images_dir>/default.jpg` is not a file.
    pub fn new(images_dir: impl Into<PathBuf>) -> Result<Self, ListingError> {
        let images_dir = images_dir.into();
        let default = images_dir.join(DEFAULT_IMAGE);
        if !default.is_file() {
            return Err(ListingError::MissingDefaultImage(default));
        }
        Ok(Self { images_dir })
    }

    pub fn default_path(&self) -> PathBuf {
        self.images_dir.join(DEFAULT_IMAGE)
    }

    /// Rejects anything that is not a flat `*.jpg` name. Never touches disk.
    pub fn validate(filename: &str) -> Result<(), ListingError> {
        if !filename.ends_with(IMAGE_SUFFIX) {
            return Err(ListingError::NotJpeg(filename.to_string()));
        }
        if filename.contains(['\\', '\0']) {
            return Err(ListingError::InvalidImageName(filename.to_string()));
        }
        let mut components = Path::new(filename).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(c)), None) if c.to_str() == Some(filename) => Ok(()),
            _ => Err(ListingError::InvalidImageName(filename.to_string())),
        }
    }

    pub async fn resolve(&self, filename: &str) -> Result<ResolvedImage, ListingError> {
        Self::validate(filename)?;

        let candidate = self.images_dir.join(filename);
        if is_file(&candidate).await {
            return Ok(ResolvedImage {
                path: candidate,
                defaulted: false,
            });
        }

        debug!(path = %candidate.display(), "image not found; serving default");
        let fallback = self.default_path();
        if !is_file(&fallback).await {
            return Err(ListingError::MissingDefaultImage(fallback));
        }
        Ok(ResolvedImage {
            path: fallback,
            defaulted: true,
        })
    }

    pub async fn load(&self, filename: &str) -> Result<ServedImage, ListingError> {
        let resolved = self.resolve(filename).await?;
        let bytes = tokio::fs::read(&resolved.path).await?;
        Ok(ServedImage {
            bytes,
            defaulted: resolved.defaulted,
        })
    }
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
