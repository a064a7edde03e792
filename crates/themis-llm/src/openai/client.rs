// OpenAI-compatible client implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

use crate::error::LlmError;
use crate::streaming::parse_chat_sse_stream_counted;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, EventStream};
use crate::types::Message;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
    skipped_frames: Arc<AtomicU64>,
}

impl OpenAIClient {
    /// Create new client with API key
    ///
    /// Fails before any I/O when the key is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey.into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|_| LlmError::InvalidConfig("API key contains invalid header characters".to_string()))?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: OPENAI_API_BASE.to_string(),
            skipped_frames: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Point the client at another OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Total SSE frames dropped as malformed since the client was created
    pub fn skipped_frames(&self) -> u64 {
        self.skipped_frames.load(Ordering::Relaxed)
    }

    /// Build chat completion request payload
    fn build_chat_request(&self, model: &str, messages: &[Message], options: &ChatOptions) -> Value {
        let mut request = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": true,
        });

        if let Some(obj) = request.as_object_mut() {
            if let Some(temp) = options.temperature {
                obj.insert("temperature".to_string(), serde_json::json!(temp));
            }
            if let Some(max_tokens) = options.max_tokens {
                obj.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
            }
        }

        request
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options);

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending streaming chat completion"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream { status, body }.into());
        }

        Ok(parse_chat_sse_stream_counted(
            response.bytes_stream(),
            Arc::clone(&self.skipped_frames),
        ))
    }
}
