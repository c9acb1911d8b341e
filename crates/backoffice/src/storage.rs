//! Local file storage for uploads.
//!
//! The hosted object store behind the original deployment is an external
//! managed service; this is its seam. Uploads land under the configured
//! data directory with UUID-prefixed names and are served back through
//! the `/files` static route.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use meridian_core::FileId;

/// Errors that can occur while storing uploads.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("empty upload")]
    Empty,
}

/// A stored upload, referenced by download URL.
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub id: FileId,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
    pub stored_at: DateTime<Utc>,
}

/// Writes uploads to the data directory and hands out download URLs.
#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
    public_base: String,
}

impl FileStorage {
    /// Creates the storage root if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl AsRef<Path>, public_base: impl Into<String>) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            public_base: public_base.into(),
        })
    }

    /// The directory served by the `/files` route.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persists one upload and returns its metadata.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Empty` for zero-byte uploads or an IO
    /// error if the write fails.
    pub async fn save(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<StoredFile, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }

        let id = FileId::generate();
        let safe_name = sanitize_file_name(file_name);
        let stored_name = format!("{id}-{safe_name}");
        let path = self.root.join(&stored_name);

        tokio::fs::write(&path, bytes).await?;

        Ok(StoredFile {
            id,
            file_name: safe_name,
            content_type: content_type.to_owned(),
            size_bytes: bytes.len() as u64,
            url: format!("{}/files/{stored_name}", self.public_base),
            stored_at: Utc::now(),
        })
    }
}

/// Strips path components and shell-hostile characters from an uploaded
/// file name.
fn sanitize_file_name(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "upload".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories_and_specials() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("bali brochure (v2).pdf"), "bali_brochure__v2_.pdf");
        assert_eq!(sanitize_file_name(""), "upload");
    }

    #[tokio::test]
    async fn save_writes_the_file_and_builds_a_url() {
        let dir = std::env::temp_dir().join(format!("meridian-storage-{}", uuid::Uuid::new_v4()));
        let storage =
            FileStorage::new(&dir, "http://localhost:3001").expect("storage root");

        let stored = storage
            .save("brochure.pdf", "application/pdf", b"%PDF-1.7")
            .await
            .expect("save");

        assert_eq!(stored.size_bytes, 8);
        assert!(stored.url.starts_with("http://localhost:3001/files/"));
        assert!(stored.url.ends_with("-brochure.pdf"));

        let on_disk = std::fs::read(dir.join(format!("{}-brochure.pdf", stored.id)))
            .expect("file on disk");
        assert_eq!(on_disk, b"%PDF-1.7");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let dir = std::env::temp_dir().join(format!("meridian-storage-{}", uuid::Uuid::new_v4()));
        let storage = FileStorage::new(&dir, "http://localhost:3001").expect("storage root");

        assert!(matches!(
            storage.save("empty.bin", "application/octet-stream", b"").await,
            Err(StorageError::Empty)
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
