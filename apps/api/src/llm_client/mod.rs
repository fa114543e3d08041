//! LLM Client: the single point of entry for all Gemini API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! All model interactions MUST go through this module.
//!
//! Model: gemini-2.5-flash (hardcoded, not configurable)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::errors::AppError;

pub mod extract;

pub use extract::extract_json_candidate;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1";
/// The model used for every evaluation.
pub const MODEL: &str = "gemini-2.5-flash";

const EMPTY_RESPONSE: &str = "Empty response received from Gemini";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if it has any.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Anything that turns a prompt into raw model text.
/// `Ok(None)` means the service answered but produced no text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<Option<String>, LlmError>;
}

/// The single Gemini client owned by the application state.
/// Wraps the `generateContent` REST endpoint. One attempt per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_version: String,
    base_url: String,
}

impl LlmClient {
    /// Builds a ready-to-use client. Fails if the key or version is empty.
    pub fn configure(
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, AppError> {
        let api_key = api_key.into();
        let api_version = api_version.into();

        if api_key.trim().is_empty() {
            return Err(AppError::Configuration(
                "API key must be provided to configure the Gemini client".to_string(),
            ));
        }
        if api_version.trim().is_empty() {
            return Err(AppError::Configuration(
                "API version cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            api_version,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at a different host (proxy, local stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replaces key and version in place. Last call wins; on error the previous
    /// configuration is left untouched.
    ///
    /// Entry point for credential rotation by code that owns an `LlmClient` directly.
    /// The server builds its client once in `main` and hands handlers an
    /// `Arc<dyn TextGenerator>`, so no request path calls this.
    #[allow(dead_code)]
    pub fn reconfigure(
        &mut self,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<(), AppError> {
        let fresh = Self::configure(api_key, api_version)?.with_base_url(self.base_url.clone());
        *self = fresh;
        Ok(())
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.api_version, MODEL
        )
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    pub async fn call(&self, prompt: &str) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(
            "Sending generateContent request (model: {MODEL}, prompt_chars: {})",
            prompt.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "Gemini call succeeded: prompt_tokens={:?}, candidate_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate_text(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let response = self.call(prompt).await?;

        if let Some(reason) = response.block_reason() {
            warn!("Gemini blocked the prompt: {reason}");
        }
        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Gemini finish reason: {reason}");
        }

        Ok(response.text())
    }
}

/// Sends `prompt` as the full content of one request and returns the JSON-looking
/// part of the answer (or the whole answer if none is found).
pub async fn generate_response(llm: &dyn TextGenerator, prompt: &str) -> Result<String, AppError> {
    let text = llm
        .generate_text(prompt)
        .await
        .map_err(|e| AppError::Model(e.to_string()))?
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Model(EMPTY_RESPONSE.to_string()))?;

    Ok(extract_json_candidate(&text).to_string())
}
