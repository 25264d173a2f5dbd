use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::MediaConfig;

const POST_IMAGES_DIR: &str = "posts_images";
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Unsupported image type: {0}")]
    UnsupportedExtension(String),

    #[error("Image is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Uploaded files on local disk, served under `url_prefix`
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
    max_image_bytes: usize,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>, max_image_bytes: usize) -> Self {
        let url_prefix = url_prefix.into().trim_end_matches('/').to_string();
        Self {
            root: root.into(),
            url_prefix,
            max_image_bytes,
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.root, &config.url_prefix, config.max_image_bytes)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Store an uploaded post image and return its path relative to the media root
    pub async fn save_post_image(&self, original_name: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let extension = Self::image_extension(original_name)?;
        if bytes.len() > self.max_image_bytes {
            return Err(MediaError::TooLarge {
                size: bytes.len(),
                limit: self.max_image_bytes,
            });
        }

        let relative = format!("{}/{}.{}", POST_IMAGES_DIR, Uuid::new_v4().simple(), extension);
        let full_path = self.root.join(&relative);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, bytes).await?;

        debug!("Stored post image {} ({} bytes)", relative, bytes.len());
        Ok(relative)
    }

    /// Best-effort removal; a missing file is not an error
    pub async fn remove(&self, relative: &str) {
        let Some(full_path) = self.resolve(relative) else {
            warn!("Refusing to remove media path outside root: {}", relative);
            return;
        };
        match tokio::fs::remove_file(&full_path).await {
            Ok(()) => debug!("Removed media file {}", relative),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove media file {}: {}", relative, e),
        }
    }

    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.url_prefix, relative.trim_start_matches('/'))
    }

    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = Path::new(relative);
        if path.components().all(|c| matches!(c, Component::Normal(_))) {
            Some(self.root.join(path))
        } else {
            None
        }
    }

    fn image_extension(original_name: &str) -> Result<String, MediaError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| MediaError::UnsupportedExtension(original_name.to_string()))?;

        if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(extension)
        } else {
            Err(MediaError::UnsupportedExtension(extension))
        }
    }
}
