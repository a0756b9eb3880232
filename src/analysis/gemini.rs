use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::Config;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("model analysis is not configured: GEMINI_API_KEY is missing")]
    MissingApiKey,

    #[error("model request timed out")]
    Timeout,

    #[error("model request failed with status {status}: {message}")]
    Http {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("model request failed: {0}")]
    Network(String),

    #[error("could not decode model response: {0}")]
    Decode(String),

    #[error("model returned no text")]
    EmptyReply,
}

impl GenerateError {
    fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }
}

/// A text-generation model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: GenerationParams)
    -> Result<String, GenerateError>;
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

/// Client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, GenerateError> {
        let api_key = config
            .gemini_api_key()
            .ok_or(GenerateError::MissingApiKey)?
            .to_string();

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| GenerateError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.gemini_base_url().trim_end_matches('/').to_string(),
            model: config.gemini_model().to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip_all, fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(
        &self,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<String, GenerateError> {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
        };

        let response = self
            .http
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(GenerateError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Http {
                status,
                message: upstream_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Decode(e.to_string()))?;

        let text = body.into_text().ok_or(GenerateError::EmptyReply)?;
        debug!(reply_len = text.len(), "Model replied");
        Ok(text)
    }
}

/// Pulls `error.message` out of a Google API error body.
fn upstream_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|s| s.to_string())
}
