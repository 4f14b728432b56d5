//! Paper ingestion pipeline
//!
//! Upload bytes -> extracted text -> LLM metadata -> blob + record. Each
//! stage's error propagates unchanged to the request boundary; nothing
//! durable exists until the blob/record writes at the end.

use crate::db::{NewPaper, Paper, PaperStore};
use crate::errors::{AppError, Result};
use crate::metadata::MetadataExtractor;
use crate::pdf;
use crate::services::{truncate_chars, PROMPT_TEXT_BUDGET};
use crate::storage::{blob_key, BlobStore};
use std::sync::Arc;
use std::time::Instant;

pub struct IngestService {
    store: Arc<dyn PaperStore>,
    blobs: Arc<dyn BlobStore>,
    extractor: MetadataExtractor,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn PaperStore>,
        blobs: Arc<dyn BlobStore>,
        extractor: MetadataExtractor,
    ) -> Self {
        Self {
            store,
            blobs,
            extractor,
        }
    }

    /// Run the full pipeline for one uploaded file.
    ///
    /// Re-uploading the same bytes creates a second, independent record;
    /// there is no deduplication.
    pub async fn ingest(&self, filename: &str, bytes: Vec<u8>, user_id: &str) -> Result<Paper> {
        if filename.trim().is_empty() {
            return Err(AppError::Validation("no file selected".to_string()));
        }

        let start = Instant::now();

        // lopdf parsing is CPU-bound; keep it off the request workers
        let (bytes, text) = tokio::task::spawn_blocking(move || {
            let text = pdf::extract_text(&bytes)?;
            Ok::<_, AppError>((bytes, text))
        })
        .await
        .map_err(|e| AppError::Extraction(format!("extraction task failed: {}", e)))??;

        let metadata = self
            .extractor
            .extract(truncate_chars(&text, PROMPT_TEXT_BUDGET))
            .await?;

        let (hash, key) = blob_key(&bytes);
        self.blobs.put(&key, &bytes).await?;

        let paper = self
            .store
            .insert(NewPaper {
                user_id: user_id.to_string(),
                title: metadata.title,
                authors: metadata.authors,
                abstract_text: metadata.abstract_text,
                tags: metadata.tags,
                file_url: metadata.file_url,
                external_id: metadata.paper_id,
                file_path: key,
                extracted_text: text,
                content_hash: hash,
            })
            .await?;

        metrics::counter!("paperdock_papers_ingested_total").increment(1);
        metrics::histogram!("paperdock_ingest_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        tracing::info!(
            paper_id = %paper.id,
            user_id = %paper.user_id,
            title = %paper.title,
            filename,
            total_ms = start.elapsed().as_millis() as u64,
            "Paper ingested"
        );

        Ok(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_pdf, MemoryFixture};

    const METADATA_JSON: &str = concat!(
        "{\"title\": \"X\", \"authors\": [\"A\", \"B\"], \"abstract\": \"About X.\", ",
        "\"tags\": [\"t1\", \"t2\", \"t3\"], \"file_url\": \"\", \"paper_id\": \"p1\"}"
    );

    fn fixture() -> MemoryFixture {
        MemoryFixture::new()
    }

    #[tokio::test]
    async fn test_empty_filename_touches_nothing() {
        let fx = fixture();
        let err = fx
            .state
            .ingest_service
            .ingest("", b"%PDF".to_vec(), "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(fx.state.papers.list_by_user("alice").await.unwrap().is_empty());
        assert_eq!(fx.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_unparseable_pdf_is_extraction_error() {
        let fx = fixture();
        let err = fx
            .state
            .ingest_service
            .ingest("paper.pdf", b"not a pdf".to_vec(), "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        assert_eq!(fx.llm.calls(), 0);
        assert!(fx.state.papers.list_by_user("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_persists_extracted_fields() {
        let fx = fixture();
        fx.llm.enqueue(METADATA_JSON);

        let paper = fx
            .state
            .ingest_service
            .ingest("paper.pdf", test_pdf(&["Title: X Authors: A, B"]), "alice")
            .await
            .unwrap();

        assert_eq!(paper.title, "X");
        assert_eq!(paper.authors, vec!["A", "B"]);
        assert_eq!(paper.abstract_text, "About X.");
        assert_eq!(paper.tags, vec!["t1", "t2", "t3"]);
        assert_eq!(paper.external_id, "p1");
        assert!(paper.extracted_text.contains("Title: X"));

        let found = fx
            .state
            .papers
            .find_by_id("alice", paper.id)
            .await
            .unwrap()
            .expect("record should exist");
        assert_eq!(found.title, paper.title);
        assert_eq!(found.authors, paper.authors);

        // the original bytes are retrievable under the recorded blob key
        assert!(fx.blobs.get(&paper.file_path).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_upload_creates_second_record() {
        let fx = fixture();
        fx.llm.enqueue(METADATA_JSON);
        fx.llm.enqueue(METADATA_JSON);

        let bytes = test_pdf(&["Title: X Authors: A, B"]);
        let first = fx
            .state
            .ingest_service
            .ingest("paper.pdf", bytes.clone(), "alice")
            .await
            .unwrap();
        let second = fx
            .state
            .ingest_service
            .ingest("paper.pdf", bytes, "alice")
            .await
            .unwrap();

        assert_ne!(first.id, second.id);
        // identical bytes converge on the same blob
        assert_eq!(first.file_path, second.file_path);
        assert_eq!(fx.state.papers.list_by_user("alice").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_metadata_blocks_insert() {
        let fx = fixture();
        fx.llm.enqueue("not json");
        fx.llm.enqueue("still not json");

        let err = fx
            .state
            .ingest_service
            .ingest("paper.pdf", test_pdf(&["some text"]), "alice")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Extraction(_)));
        assert!(fx.state.papers.list_by_user("alice").await.unwrap().is_empty());
    }
}
