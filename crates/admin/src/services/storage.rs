//! Product image storage on local disk.
//!
//! Uploaded files are sniffed by their leading bytes, given a random name,
//! and written under the upload directory. The public URL is the configured
//! image base URL plus the file name; the directory itself is served by the
//! web tier.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted upload.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Errors from storing or listing images.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("image is empty")]
    Empty,

    #[error("image is larger than {} MiB", MAX_IMAGE_BYTES / 1024 / 1024)]
    TooLarge,

    #[error("only JPEG, PNG and WebP images are accepted")]
    UnsupportedType,

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Image formats accepted for product photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    WebP,
}

impl ImageKind {
    /// Detect the format from the file's leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.get(..4) == Some(b"RIFF") && bytes.get(8..12) == Some(b"WEBP") {
            Some(Self::WebP)
        } else {
            None
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::WebP => "webp",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }
}

/// An image in the upload directory.
#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub file_name: String,
    pub url: String,
    pub size: u64,
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Local-disk image store.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    dir: PathBuf,
    base_url: String,
}

impl ImageStorage {
    /// Create a store writing to `dir` and linking under `base_url`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Directory images are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Public URL for a stored file name.
    #[must_use]
    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{file_name}", self.base_url)
    }

    /// Create the upload directory if it is missing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Validate and write an uploaded image.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Empty`, `StorageError::TooLarge` or
    /// `StorageError::UnsupportedType` for rejected uploads.
    pub async fn save(&self, bytes: &[u8]) -> Result<StoredImage, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge);
        }
        let kind = ImageKind::sniff(bytes).ok_or(StorageError::UnsupportedType)?;

        self.ensure_dir().await?;
        let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!(file_name = %file_name, size = bytes.len(), "Image stored");

        Ok(StoredImage {
            url: self.url_for(&file_name),
            file_name,
            size: bytes.len() as u64,
            uploaded_at: Some(Utc::now()),
        })
    }

    /// All stored images, newest first.
    ///
    /// Files without an image extension are skipped. A missing directory
    /// yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be read.
    pub async fn list(&self) -> Result<Vec<StoredImage>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut images = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let is_image = Path::new(&file_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageKind::from_extension)
                .is_some();
            if !is_image {
                continue;
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            images.push(StoredImage {
                url: self.url_for(&file_name),
                file_name,
                size: metadata.len(),
                uploaded_at: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        images.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });
        Ok(images)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
    const WEBP: &[u8] = b"RIFF\x24\0\0\0WEBPVP8 ";

    #[test]
    fn test_sniff() {
        assert_eq!(ImageKind::sniff(PNG), Some(ImageKind::Png));
        assert_eq!(ImageKind::sniff(JPEG), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::sniff(WEBP), Some(ImageKind::WebP));
        assert_eq!(ImageKind::sniff(b"GIF89a"), None);
        assert_eq!(ImageKind::sniff(b"RIFF"), None);
        assert_eq!(ImageKind::sniff(b""), None);
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let storage = ImageStorage::new("/tmp/x", "https://cdn.xstore.in/img/");
        assert_eq!(
            storage.url_for("a.png"),
            "https://cdn.xstore.in/img/a.png"
        );
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().join("uploads"), "/uploads");

        assert!(storage.list().await.unwrap().is_empty());

        let stored = storage.save(PNG).await.unwrap();
        assert!(stored.file_name.ends_with(".png"));
        assert_eq!(stored.url, format!("/uploads/{}", stored.file_name));
        assert_eq!(stored.size, PNG.len() as u64);

        tokio::fs::write(dir.path().join("uploads/notes.txt"), b"hi")
            .await
            .unwrap();

        let listed = storage.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed.first().unwrap().file_name, stored.file_name);
    }

    #[tokio::test]
    async fn test_save_rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path(), "/uploads");

        assert!(matches!(storage.save(b"").await, Err(StorageError::Empty)));
        assert!(matches!(
            storage.save(b"%PDF-1.7").await,
            Err(StorageError::UnsupportedType)
        ));

        let mut big = PNG.to_vec();
        big.resize(MAX_IMAGE_BYTES + 1, 0);
        assert!(matches!(
            storage.save(&big).await,
            Err(StorageError::TooLarge)
        ));
        assert!(storage.list().await.unwrap().is_empty());
    }
}
