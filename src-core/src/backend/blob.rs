//! Filesystem Blob Store
//!
//! Writes uploads under a root directory and hands back
//! `<base_url>/<percent-encoded object path>` download URLs, the same
//! shape hosted object storage returns.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::path::{Component, Path, PathBuf};

use super::traits::{BackendError, BackendResult, BlobStore};

/// Object names are encoded as one URL segment, slashes included
const OBJECT_NAME: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn download_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, utf8_percent_encode(path, OBJECT_NAME))
    }

    /// Resolve an object path below the root, rejecting escapes
    fn resolve(&self, path: &str) -> BackendResult<PathBuf> {
        let relative = Path::new(path);
        let clean = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(BackendError::Storage(format!("Invalid object path: {}", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> BackendResult<String> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BackendError::Storage(e.to_string()))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| BackendError::Storage(e.to_string()))?;

        log::debug!("Stored blob {} ({})", path, content_type);
        Ok(self.download_url(path))
    }

    async fn delete(&self, path: &str) -> BackendResult<()> {
        let target = self.resolve(path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "https://files.crewdesk.app/o/");

        let url = store
            .upload("attachments/chan 1/abc-photo.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "https://files.crewdesk.app/o/attachments%2Fchan%201%2Fabc-photo.png");
        let written = std::fs::read(dir.path().join("attachments/chan 1/abc-photo.png")).unwrap();
        assert_eq!(written, vec![1, 2, 3]);

        store.delete("attachments/chan 1/abc-photo.png").await.unwrap();
        store.delete("attachments/chan 1/abc-photo.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path(), "http://localhost");
        assert!(store.upload("../evil", vec![], "text/plain").await.is_err());
        assert!(store.upload("/abs/path", vec![], "text/plain").await.is_err());
        assert!(store.upload("", vec![], "text/plain").await.is_err());
    }
}
