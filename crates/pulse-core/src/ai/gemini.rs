//! Gemini REST client.
//!
//! Talks to `models/{model}:generateContent` with optional Google Search
//! grounding. One request per call; non-2xx responses become
//! [`Error::Provider`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GroundedText, IntelProvider};
use crate::error::{Error, Result};
use crate::types::{Message, Role};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for the Gemini provider
///
/// The default carries no API key; the caller resolves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            base_url: GEMINI_API_BASE.to_string(),
            timeout_secs: 120,
        }
    }
}

/// Gemini generative-AI provider
#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        debug!(
            "Gemini request: model={} turns={} search={}",
            self.config.model,
            request.contents.len(),
            request.tools.is_some()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::provider(status.as_u16(), body));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

#[async_trait]
impl IntelProvider for GeminiClient {
    async fn search(&self, prompt: &str) -> Result<GroundedText> {
        let request = GenerateContentRequest::new(vec![Content::user(prompt)]).with_search();
        let response = self.generate_content(&request).await?;
        Ok(GroundedText {
            text: response.text(),
            sources: response.grounding_sources(),
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest::new(vec![Content::user(prompt)]);
        Ok(self.generate_content(&request).await?.text())
    }

    async fn chat(
        &self,
        system_instruction: &str,
        history: &[Message],
        message: &str,
    ) -> Result<String> {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::user(message));

        let request = GenerateContentRequest::new(contents)
            .with_system_instruction(system_instruction)
            .with_search();
        Ok(self.generate_content(&request).await?.text())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

impl GenerateContentRequest {
    fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
            tools: None,
        }
    }

    fn with_search(mut self) -> Self {
        self.tools = Some(vec![Tool {
            google_search: serde_json::Map::new(),
        }]);
        self
    }

    fn with_system_instruction(mut self, text: &str) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        });
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some(Role::User.as_str().to_string()),
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

impl From<&Message> for Content {
    fn from(message: &Message) -> Self {
        Self {
            role: Some(message.role.as_str().to_string()),
            parts: vec![Part {
                text: Some(message.content.clone()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Web URIs from the first candidate's grounding chunks.
    fn grounding_sources(&self) -> Vec<String> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref()?.uri.clone())
                    .filter(|uri| !uri.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
