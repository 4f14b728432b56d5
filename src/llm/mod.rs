//! LLM provider abstraction
//!
//! A single text-in/text-out seam used by both metadata extraction and the
//! chat flow. The real client speaks the OpenAI-compatible chat-completions
//! protocol; [`MockLlm`] backs dev mode and tests.

use crate::config::LlmConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the given prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// OpenAI-compatible chat-completions client
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::LlmCall(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmClient for ChatCompletionsClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.config.api_base);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        metrics::counter!("paperdock_llm_requests_total").increment(1);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::counter!("paperdock_llm_errors_total").increment(1);
                AppError::LlmCall(format!("request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::counter!("paperdock_llm_errors_total").increment(1);
            return Err(AppError::LlmCall(format!("API error {}: {}", status, body)));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::LlmCall(format!("failed to parse response: {}", e)))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| AppError::LlmCall("empty response from provider".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Scripted client for dev mode and tests
///
/// Returns queued responses in order; once the queue is empty it falls back
/// to canned output keyed off the prompt shape.
#[derive(Default)]
pub struct MockLlm {
    scripted: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response to return
    pub fn enqueue(&self, response: impl Into<String>) {
        self.scripted.lock().unwrap().push_back(response.into());
    }

    /// Number of generate() calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn canned(prompt: &str) -> String {
        if prompt.contains("Respond ONLY with") {
            concat!(
                "{\"title\": \"Mock Paper\", \"authors\": [\"Mock Author\"], ",
                "\"abstract\": \"Canned abstract for development use.\", ",
                "\"tags\": [\"mock\", \"development\", \"testing\"], ",
                "\"file_url\": \"\", \"paper_id\": \"mock-0001\"}"
            )
            .to_string()
        } else {
            "The supplied content does not answer this question. [mock response]".to_string()
        }
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| Self::canned(prompt)))
    }

    fn model_name(&self) -> &str {
        "mock-llm"
    }
}
