//! Chat-on-paper flow
//!
//! Looks up a stored record, grounds a prompt in its content, and returns
//! the model's answer. Stateless: no conversation history across calls.

use crate::db::{Paper, PaperStore};
use crate::errors::{AppError, Result};
use crate::llm::LlmClient;
use crate::not_found;
use crate::pdf;
use crate::services::{truncate_chars, PROMPT_TEXT_BUDGET};
use crate::storage::BlobStore;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// One question/answer round against a stored paper
#[derive(Debug, Clone, Serialize)]
pub struct ChatExchange {
    pub question: String,
    pub answer: String,
    pub paper_title: String,
}

pub struct ChatService {
    store: Arc<dyn PaperStore>,
    blobs: Arc<dyn BlobStore>,
    llm: Arc<dyn LlmClient>,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn PaperStore>,
        blobs: Arc<dyn BlobStore>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self { store, blobs, llm }
    }

    pub async fn chat(&self, user_id: &str, paper_id: Uuid, question: &str) -> Result<ChatExchange> {
        if question.trim().is_empty() {
            return Err(AppError::Validation("question is required".to_string()));
        }

        let start = Instant::now();

        let paper = self
            .store
            .find_by_id(user_id, paper_id)
            .await?
            .ok_or_else(|| not_found!("paper", paper_id))?;

        let text = self.paper_text(&paper).await?;
        let prompt = build_grounding_prompt(&paper, truncate_chars(&text, PROMPT_TEXT_BUDGET), question);
        let answer = self.llm.generate(&prompt).await?.trim().to_string();

        metrics::counter!("paperdock_chat_requests_total").increment(1);
        metrics::histogram!("paperdock_chat_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        tracing::info!(
            paper_id = %paper.id,
            user_id = %paper.user_id,
            total_ms = start.elapsed().as_millis() as u64,
            "Chat answered"
        );

        Ok(ChatExchange {
            question: question.to_string(),
            answer,
            paper_title: paper.title,
        })
    }

    /// Paper text for grounding: the copy cached at ingestion, or a blob
    /// re-extraction for records that carry none.
    async fn paper_text(&self, paper: &Paper) -> Result<String> {
        if !paper.extracted_text.is_empty() {
            return Ok(paper.extracted_text.clone());
        }

        tracing::debug!(paper_id = %paper.id, "No cached text, re-extracting from blob");
        let bytes = self.blobs.get(&paper.file_path).await?;
        let text = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
            .await
            .map_err(|e| AppError::Extraction(format!("extraction task failed: {}", e)))??;
        Ok(text)
    }
}

fn build_grounding_prompt(paper: &Paper, text: &str, question: &str) -> String {
    format!(
        "You are answering questions about a research paper. Use ONLY the content \
         provided below. If the content does not answer the question, say so politely.\n\n\
         Title: {}\n\n\
         Abstract: {}\n\n\
         Paper content:\n{}\n\n\
         Question: {}\n\n\
         Answer:",
        paper.title, paper.abstract_text, text, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewPaper;
    use crate::storage::blob_key;
    use crate::test_support::{test_pdf, MemoryFixture};

    async fn seed_paper(fx: &MemoryFixture, extracted_text: &str, file_path: &str) -> Paper {
        fx.state
            .papers
            .insert(NewPaper {
                user_id: "alice".to_string(),
                title: "X".to_string(),
                authors: vec!["A".to_string()],
                abstract_text: "About X.".to_string(),
                tags: vec!["t1".into(), "t2".into(), "t3".into()],
                file_url: String::new(),
                external_id: "p1".to_string(),
                file_path: file_path.to_string(),
                extracted_text: extracted_text.to_string(),
                content_hash: "h".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_paper_fails_before_any_work() {
        let fx = MemoryFixture::new();
        let err = fx
            .state
            .chat_service
            .chat("alice", Uuid::new_v4(), "What is X?")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(err.to_string().starts_with("paper not found"));
        assert_eq!(fx.blobs.gets(), 0);
        assert_eq!(fx.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_question_is_rejected() {
        let fx = MemoryFixture::new();
        let paper = seed_paper(&fx, "cached text", "k.pdf").await;
        let err = fx
            .state
            .chat_service
            .chat("alice", paper.id, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fx.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_cached_text_skips_blob_download() {
        let fx = MemoryFixture::new();
        let paper = seed_paper(&fx, "cached paper text", "k.pdf").await;
        fx.llm.enqueue("X is a paper.");

        let exchange = fx
            .state
            .chat_service
            .chat("alice", paper.id, "What is X?")
            .await
            .unwrap();

        assert_eq!(exchange.answer, "X is a paper.");
        assert_eq!(exchange.question, "What is X?");
        assert_eq!(exchange.paper_title, "X");
        assert_eq!(fx.blobs.gets(), 0);
        assert_eq!(fx.llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_uncached_record_falls_back_to_blob() {
        let fx = MemoryFixture::new();
        let bytes = test_pdf(&["body of the paper"]);
        let (_, key) = blob_key(&bytes);
        fx.blobs.put(&key, &bytes).await.unwrap();
        let paper = seed_paper(&fx, "", &key).await;
        fx.llm.enqueue("Grounded answer.");

        let exchange = fx
            .state
            .chat_service
            .chat("alice", paper.id, "What is in the body?")
            .await
            .unwrap();

        assert_eq!(exchange.answer, "Grounded answer.");
        assert_eq!(fx.blobs.gets(), 1);
    }

    #[tokio::test]
    async fn test_missing_blob_surfaces_not_found() {
        let fx = MemoryFixture::new();
        let paper = seed_paper(&fx, "", "missing.pdf").await;
        let err = fx
            .state
            .chat_service
            .chat("alice", paper.id, "anything?")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("blob not found"));
        assert_eq!(fx.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_is_trimmed() {
        let fx = MemoryFixture::new();
        let paper = seed_paper(&fx, "cached", "k.pdf").await;
        fx.llm.enqueue("  padded answer \n");
        let exchange = fx
            .state
            .chat_service
            .chat("alice", paper.id, "Q?")
            .await
            .unwrap();
        assert_eq!(exchange.answer, "padded answer");
    }

    #[test]
    fn test_grounding_prompt_embeds_paper_fields() {
        let paper = Paper {
            id: Uuid::new_v4(),
            user_id: "u".into(),
            title: "X".into(),
            authors: vec![],
            abstract_text: "About X.".into(),
            tags: vec![],
            file_url: String::new(),
            external_id: "p1".into(),
            file_path: "k.pdf".into(),
            extracted_text: String::new(),
            content_hash: "h".into(),
            created_at: chrono::Utc::now(),
        };
        let prompt = build_grounding_prompt(&paper, "the text", "What is X?");
        assert!(prompt.contains("Title: X"));
        assert!(prompt.contains("Abstract: About X."));
        assert!(prompt.contains("the text"));
        assert!(prompt.contains("Question: What is X?"));
        assert!(prompt.contains("ONLY"));
    }
}
