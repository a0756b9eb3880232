use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use crate::analysis::AnalysisMode;
use crate::entities::{RAW_CONTENT_MAX_CHARS, ScrapeResult, truncate_chars};
use crate::extractor::NoMatch;

pub const MAX_URL_LEN: usize = 2048;

fn default_use_model_analysis() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Ask for model analysis. Falls back to the deterministic summary when
    /// no model is available.
    #[serde(default = "default_use_model_analysis", alias = "useGemini")]
    pub use_model_analysis: bool,
}

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedScrape {
    pub url: Url,
    pub keywords: Vec<String>,
    pub mode: AnalysisMode,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, keywords: Vec<String>, use_model_analysis: bool) -> Self {
        Self {
            url: url.into(),
            keywords,
            use_model_analysis,
        }
    }

    pub fn validate(&self) -> Result<ValidatedScrape, String> {
        let url = validate_url(&self.url)?;
        let keywords = self
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| k.to_string())
            .collect();

        Ok(ValidatedScrape {
            url,
            keywords,
            mode: AnalysisMode::from_flag(self.use_model_analysis),
        })
    }
}

fn validate_url(raw: &str) -> Result<Url, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("URL cannot be empty".to_string());
    }
    if raw.len() > MAX_URL_LEN {
        return Err("URL too long".to_string());
    }
    let url = Url::parse(raw).map_err(|e| format!("Invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("Unsupported URL scheme: {}", other)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NoMatchResponse {
    pub url: String,
    pub keywords: Vec<String>,
    pub message: String,
}

impl From<NoMatch> for NoMatchResponse {
    fn from(no_match: NoMatch) -> Self {
        let message = no_match.message();
        Self {
            url: no_match.url,
            keywords: no_match.keywords,
            message,
        }
    }
}

/// Envelope of `POST /v1/scrape`. Exactly one of `data`, `noMatch` and
/// `error` is set.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScrapeResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_match: Option<NoMatchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScrapeResponse {
    pub fn data(result: ScrapeResult) -> Self {
        Self {
            success: true,
            data: Some(result),
            no_match: None,
            error: None,
        }
    }

    pub fn no_match(no_match: NoMatch) -> Self {
        Self {
            success: true,
            data: None,
            no_match: Some(no_match.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            no_match: None,
            error: Some(error.into()),
        }
    }
}

/// Body of `POST /v1/scrapes`: a scrape result as returned by
/// `POST /v1/scrape`. Store-assigned fields sent by the client are ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SaveScrapeRequest(pub ScrapeResult);

impl SaveScrapeRequest {
    pub fn validate(self) -> Result<ScrapeResult, String> {
        let mut result = self.0;
        validate_url(&result.url)?;

        if let Some(score) = result.relevance_score
            && !(0.0..=10.0).contains(&score)
        {
            return Err("relevance_score must be between 0 and 10".to_string());
        }

        result.id = None;
        result.created_at = None;
        result.user_id = None;
        result.keywords = result
            .keywords
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        result.highlighted_content.retain(|h| !h.text.trim().is_empty());
        result.raw_content = result
            .raw_content
            .map(|raw| truncate_chars(&raw, RAW_CONTENT_MAX_CHARS));

        Ok(result)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScrapeListResponse {
    pub scrapes: Vec<ScrapeResult>,
}
