//! Structured metadata extraction
//!
//! Prompts the LLM for six metadata fields over the paper text, then decodes
//! and validates the reply. The JSON contract is enforced on our side: the
//! raw reply is fence-stripped, decoded, and checked against an explicit
//! schema, with a bounded corrective follow-up prompt on rejection.

use crate::errors::{AppError, Result};
use crate::llm::LlmClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Metadata record produced by the LLM.
///
/// All six fields must be present in the decoded JSON; a missing field is an
/// extraction failure, not a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PaperMetadata {
    #[validate(length(min = 1))]
    pub title: String,

    pub authors: Vec<String>,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    #[validate(length(min = 3, max = 5))]
    pub tags: Vec<String>,

    pub file_url: String,

    /// DOI/arXiv-style identifier, or a model-generated unique token
    #[validate(length(min = 1))]
    pub paper_id: String,
}

/// Attempt budget for the call-decode-validate loop
#[derive(Debug, Clone, Copy)]
pub struct ExtractionPolicy {
    /// Total generate() attempts: the initial call plus corrective retries
    pub max_attempts: u32,
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self { max_attempts: 2 }
    }
}

pub struct MetadataExtractor {
    llm: Arc<dyn LlmClient>,
    policy: ExtractionPolicy,
}

impl MetadataExtractor {
    pub fn new(llm: Arc<dyn LlmClient>, policy: ExtractionPolicy) -> Self {
        Self { llm, policy }
    }

    /// Extract structured metadata from paper text.
    ///
    /// The caller is responsible for truncating `text` to its prompt budget.
    /// Provider failures surface as [`AppError::LlmCall`]; a reply that still
    /// fails decoding or validation once the attempt budget is spent surfaces
    /// as [`AppError::Extraction`] carrying the raw reply.
    pub async fn extract(&self, text: &str) -> Result<PaperMetadata> {
        let mut raw = self.llm.generate(&build_metadata_prompt(text)).await?;
        let mut attempt = 1;

        loop {
            match parse_metadata(&raw) {
                Ok(metadata) => {
                    tracing::debug!(
                        attempts = attempt,
                        title = %metadata.title,
                        "Metadata extracted"
                    );
                    return Ok(metadata);
                }
                Err(reason) if attempt < self.policy.max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        %reason,
                        "Metadata response rejected, sending corrective prompt"
                    );
                    raw = self.llm.generate(&build_repair_prompt(&reason, &raw)).await?;
                    attempt += 1;
                }
                Err(reason) => {
                    metrics::counter!("paperdock_metadata_failures_total").increment(1);
                    return Err(AppError::Extraction(format!(
                        "metadata response rejected after {} attempt(s): {}; raw response: {}",
                        attempt, reason, raw
                    )));
                }
            }
        }
    }
}

fn build_metadata_prompt(text: &str) -> String {
    format!(
        "Analyze this research paper text and extract the following information in JSON format:\n\n\
         1. title: The paper's title\n\
         2. authors: List of author names\n\
         3. abstract: The abstract or summary (2-3 sentences if no abstract is found)\n\
         4. tags: 3-5 relevant topic tags/keywords\n\
         5. file_url: URL where the paper is hosted, or an empty string\n\
         6. paper_id: A unique identifier for the paper (e.g. DOI or arXiv ID; if not found, generate a unique string)\n\n\
         Paper text:\n{}\n\n\
         Respond ONLY with a single valid JSON object in this exact format:\n\
         {{\"title\": \"Paper Title Here\", \"authors\": [\"Author 1\", \"Author 2\"], \
         \"abstract\": \"Abstract text here...\", \"tags\": [\"tag1\", \"tag2\", \"tag3\"], \
         \"file_url\": \"URL here or empty string\", \"paper_id\": \"unique-paper-id-here\"}}",
        text
    )
}

fn build_repair_prompt(reason: &str, raw: &str) -> String {
    format!(
        "Your previous reply was rejected: {}\n\n\
         Previous reply:\n{}\n\n\
         Respond again with ONLY the corrected JSON object. No prose, no code fences.",
        reason, raw
    )
}

/// Decode and validate a raw LLM reply
fn parse_metadata(raw: &str) -> std::result::Result<PaperMetadata, String> {
    let payload = strip_code_fence(raw);
    let metadata: PaperMetadata = serde_json::from_str(payload)
        .map_err(|e| format!("reply is not the required JSON object: {}", e))?;
    metadata
        .validate()
        .map_err(|e| format!("decoded fields failed validation: {}", e))?;
    Ok(metadata)
}

/// Strip a Markdown code fence, with or without a language tag
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    // drop a language tag on the opening fence line
    let rest = match rest.split_once('\n') {
        Some((tag, body)) if tag.chars().all(|c| c.is_ascii_alphanumeric()) => body,
        _ => rest,
    };
    rest.trim()
}
