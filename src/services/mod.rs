//! Service layer
//!
//! Business logic for the ingestion pipeline and the chat flow. Services are
//! thread-safe and shared via Arc; all external capabilities are injected
//! at construction.

pub mod chat;
pub mod ingest;

use crate::db::PaperStore;
use crate::llm::LlmClient;
use crate::metadata::{ExtractionPolicy, MetadataExtractor};
use crate::storage::BlobStore;
use std::sync::Arc;

/// Characters of extracted text supplied to the LLM for both metadata
/// extraction and chat grounding.
pub(crate) const PROMPT_TEXT_BUDGET: usize = 8000;

/// Truncate to at most `max` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Application state container for dependency injection
#[derive(Clone)]
pub struct AppState {
    pub papers: Arc<dyn PaperStore>,
    pub ingest_service: Arc<ingest::IngestService>,
    pub chat_service: Arc<chat::ChatService>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn PaperStore>,
        blobs: Arc<dyn BlobStore>,
        llm: Arc<dyn LlmClient>,
        policy: ExtractionPolicy,
    ) -> Self {
        let extractor = MetadataExtractor::new(llm.clone(), policy);
        Self {
            papers: store.clone(),
            ingest_service: Arc::new(ingest::IngestService::new(
                store.clone(),
                blobs.clone(),
                extractor,
            )),
            chat_service: Arc::new(chat::ChatService::new(store, blobs, llm)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 3), "hel");
        // multi-byte chars are kept whole
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
