//! Persistence layer
//!
//! Domain types plus the [`PaperStore`] seam. Production uses the
//! SeaORM-backed [`Repository`]; dev mode and tests use
//! [`MemoryPaperStore`].

pub mod memory;
pub mod paper;
pub mod repository;

pub use memory::MemoryPaperStore;
pub use repository::Repository;

use crate::errors::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted paper record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Server-generated id; the only lookup key
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub file_url: String,
    /// Identifier reported by the model (DOI/arXiv id or generated token)
    pub external_id: String,
    /// Blob-store key of the original bytes
    pub file_path: String,
    /// Text extracted at ingestion time, reused by the chat flow
    pub extracted_text: String,
    /// sha-256 of the original bytes
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a record about to be inserted; id and created_at are assigned
/// by the store.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub user_id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub tags: Vec<String>,
    pub file_url: String,
    pub external_id: String,
    pub file_path: String,
    pub extracted_text: String,
    pub content_hash: String,
}

#[async_trait]
pub trait PaperStore: Send + Sync {
    /// Insert a record, assigning id and created_at server-side
    async fn insert(&self, paper: NewPaper) -> Result<Paper>;

    /// All records owned by the user, newest first; empty is not an error
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Paper>>;

    /// Exact-match lookup by generated id
    async fn find_by_id(&self, user_id: &str, id: Uuid) -> Result<Option<Paper>>;

    /// Exact-title search; explicitly multi-result
    async fn search_by_title(&self, user_id: &str, title: &str) -> Result<Vec<Paper>>;

    /// Conditional single-statement delete; returns whether a row was removed
    async fn delete_by_id(&self, user_id: &str, id: Uuid) -> Result<bool>;

    /// Connectivity probe for the readiness check
    async fn ping(&self) -> Result<()>;
}
