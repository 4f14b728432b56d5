//! Blob storage
//!
//! Stores the original uploaded bytes under content-addressed keys so the
//! chat flow can re-fetch them by the `file_path` kept on the record.

use crate::errors::{AppError, Result};
use crate::not_found;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Content-addressed key for a blob: `"{sha256-hex}.pdf"`
pub fn blob_key(bytes: &[u8]) -> (String, String) {
    let hash = hex::encode(Sha256::digest(bytes));
    let key = format!("{}.pdf", hash);
    (hash, key)
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under the given key; overwriting an identical key is fine
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Fetch the bytes stored under the key
    async fn get(&self, key: &str) -> Result<Vec<u8>>;
}

/// Filesystem-backed blob store
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Persistence(format!("failed to create blob root: {}", e)))?;
        tokio::fs::write(self.root.join(key), bytes)
            .await
            .map_err(|e| AppError::Persistence(format!("failed to write blob {}: {}", key, e)))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        match tokio::fs::read(self.root.join(key)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found!("blob", key)),
            Err(e) => Err(AppError::Persistence(format!(
                "failed to read blob {}: {}",
                key, e
            ))),
        }
    }
}

/// In-process blob store for dev mode and tests
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    gets: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of get() calls made so far
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.blobs
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| not_found!("blob", key))
    }
}
