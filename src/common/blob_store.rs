use async_trait::async_trait;
use path_clean::clean;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tokio::fs;

use crate::common::settings::Settings;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob key: {0}")]
    InvalidKey(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-addressed object storage for full photos and face crops.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), BlobError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
    fn presigned_url(&self, key: &str, ttl_secs: u64, force_download: bool) -> String;
}

/// Filesystem-backed store rooted at `blob_root`. Presigned URLs resolve to
/// the `/download/blob` route and carry an expiry plus a keyed hash.
pub struct FsBlobStore {
    root: PathBuf,
    presign_secret: String,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, presign_secret: &str) -> Self {
        Self {
            root: root.into(),
            presign_secret: presign_secret.to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.blob_root, &settings.presign_secret)
    }

    /// Maps a key onto a path under the store root, rejecting traversal.
    ///
    /// # Errors
    /// When the key escapes the root or is empty.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        let path = clean(self.root.join(key));
        if !path.starts_with(&self.root) {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(path)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8], _content_type: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.resolve(key)?;
        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobError::NotFound(key.to_string()),
            _ => BlobError::Io(e),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
            Err(e) => Err(BlobError::Io(e)),
        }
    }

    fn presigned_url(&self, key: &str, ttl_secs: u64, force_download: bool) -> String {
        let expires = now_unix() + ttl_secs;
        let dl = u8::from(force_download);
        let sig = sign(&self.presign_secret, key, expires, force_download);
        format!("/download/blob?key={key}&expires={expires}&dl={dl}&sig={sig}")
    }
}

#[must_use]
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[must_use]
pub fn sign(secret: &str, key: &str, expires: u64, force_download: bool) -> String {
    let dl = u8::from(force_download);
    let digest = Sha256::digest(format!("{secret}:{key}:{expires}:{dl}").as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[must_use]
pub fn verify_sig(secret: &str, key: &str, expires: u64, force_download: bool, sig: &str) -> bool {
    sign(secret, key, expires, force_download) == sig
}
