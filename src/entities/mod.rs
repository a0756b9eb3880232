use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use utoipa::ToSchema;
use uuid::Uuid;

/// Upper bound on the stored raw content snapshot, in characters.
pub const RAW_CONTENT_MAX_CHARS: usize = 2000;

/// --- Value types ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub url: String,
    pub text: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportanceLevel {
    High,
    Medium,
    Low,
}

/// Importance is stored either as a score or as a level, depending on who
/// produced the excerpt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum Importance {
    Score(f64),
    Level(ImportanceLevel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HighlightedExcerpt {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<Importance>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OgData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl OgData {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image.is_none() && self.url.is_none()
    }
}

/// Drafts for the four social platforms: professional, microblog, photo
/// caption and conversational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SocialPosts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

impl SocialPosts {
    pub fn is_empty(&self) -> bool {
        self.linkedin.is_none()
            && self.twitter.is_none()
            && self.instagram.is_none()
            && self.facebook.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSource {
    Model,
    Deterministic,
}

impl AnalysisSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Deterministic => "deterministic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "model" => Some(Self::Model),
            "deterministic" => Some(Self::Deterministic),
            _ => None,
        }
    }
}

/// --- Tables ---

/// One scrape, either transient (fresh from the pipeline, no id) or stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScrapeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub highlighted_content: Vec<HighlightedExcerpt>,
    #[serde(default)]
    pub og_data: Option<OgData>,
    #[serde(default)]
    pub raw_content: Option<String>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub short_summary: Option<String>,
    #[serde(default)]
    pub verified_origin: Option<String>,
    #[serde(default)]
    pub future_forecast: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f32>,
    #[serde(default)]
    pub social_posts: Option<SocialPosts>,
    #[serde(default)]
    pub key_highlights: Option<Vec<String>>,
    #[serde(default)]
    pub analysis_source: Option<AnalysisSource>,
}

impl ScrapeResult {
    /// A bare result for `url`; every analysed field empty.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: None,
            created_at: None,
            user_id: None,
            url: url.into(),
            title: None,
            meta_description: None,
            keywords: Vec::new(),
            links: Vec::new(),
            highlighted_content: Vec::new(),
            og_data: None,
            raw_content: None,
            ai_summary: None,
            short_summary: None,
            verified_origin: None,
            future_forecast: None,
            relevance_score: None,
            social_posts: None,
            key_highlights: None,
            analysis_source: None,
        }
    }
}

/// Row shape of the `scrapes` table.
#[derive(Debug, Clone, FromRow)]
pub struct ScrapeRow {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub url: String,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Vec<String>,
    pub links: Json<Vec<Link>>,
    pub highlighted_content: Json<Vec<HighlightedExcerpt>>,
    pub og_data: Option<Json<OgData>>,
    pub raw_content: Option<String>,
    pub ai_summary: Option<String>,
    pub short_summary: Option<String>,
    pub verified_origin: Option<String>,
    pub future_forecast: Option<String>,
    pub relevance_score: Option<f32>,
    pub social_posts: Option<Json<SocialPosts>>,
    pub key_highlights: Option<Json<Vec<String>>>,
    pub analysis_source: Option<String>,
}

impl From<ScrapeRow> for ScrapeResult {
    fn from(row: ScrapeRow) -> Self {
        Self {
            id: Some(row.id),
            created_at: Some(row.created_at),
            user_id: Some(row.user_id),
            url: row.url,
            title: row.title,
            meta_description: row.meta_description,
            keywords: row.keywords,
            links: row.links.0,
            highlighted_content: row.highlighted_content.0,
            og_data: row.og_data.map(|j| j.0),
            raw_content: row.raw_content,
            ai_summary: row.ai_summary,
            short_summary: row.short_summary,
            verified_origin: row.verified_origin,
            future_forecast: row.future_forecast,
            relevance_score: row.relevance_score,
            social_posts: row.social_posts.map(|j| j.0),
            key_highlights: row.key_highlights.map(|j| j.0),
            analysis_source: row.analysis_source.as_deref().and_then(AnalysisSource::parse),
        }
    }
}

/// Truncates `text` to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
