//! Request-to-result orchestration: validate, fetch, clean, filter, analyze.

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::{
    analysis::{Analysis, AnalysisEngine, AnalysisRequest},
    entities::{
        HighlightedExcerpt, Importance, ImportanceLevel, RAW_CONTENT_MAX_CHARS, ScrapeResult,
        truncate_chars,
    },
    extractor::{FilterOutcome, NoMatch, extract_text, filter_by_keywords},
    fetcher::{FetchError, FetchedPage, PageFetcher},
    scrapes::dtos::ScrapeRequest,
};

#[derive(Debug)]
pub enum ScrapeOutcome {
    Completed(Box<ScrapeResult>),
    NoMatch(NoMatch),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotConfigured(FetchError),

    #[error("{0}")]
    Fetch(FetchError),
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        if err.is_configuration() {
            Self::NotConfigured(err)
        } else {
            Self::Fetch(err)
        }
    }
}

#[derive(Clone)]
pub struct ScrapePipeline {
    fetcher: Option<Arc<dyn PageFetcher>>,
    engine: AnalysisEngine,
}

impl ScrapePipeline {
    /// `fetcher` is `None` when content extraction has no credentials; every
    /// run then fails with [`PipelineError::NotConfigured`].
    pub fn new(fetcher: Option<Arc<dyn PageFetcher>>, engine: AnalysisEngine) -> Self {
        Self { fetcher, engine }
    }

    pub fn can_fetch(&self) -> bool {
        self.fetcher.is_some()
    }

    pub fn has_model(&self) -> bool {
        self.engine.has_model()
    }

    #[instrument(skip_all, fields(url = %request.url, keywords = request.keywords.len()))]
    pub async fn run(&self, request: &ScrapeRequest) -> Result<ScrapeOutcome, PipelineError> {
        let request = request.validate().map_err(PipelineError::Validation)?;
        let fetcher = self
            .fetcher
            .as_ref()
            .ok_or(PipelineError::NotConfigured(FetchError::MissingApiKey))?;

        let page = fetcher.fetch(&request.url, &request.keywords).await?;
        let text = extract_text(&page);
        let title = resolve_title(&page);

        let filtered = match filter_by_keywords(
            &text,
            &request.keywords,
            Some(title.as_str()),
            request.url.as_str(),
        ) {
            FilterOutcome::Content(filtered) => filtered,
            FilterOutcome::NoMatch(no_match) => {
                info!("No keyword matched the page");
                return Ok(ScrapeOutcome::NoMatch(no_match));
            }
        };

        let site_keywords = page.site_keywords();
        let analysis = self
            .engine
            .analyze(&AnalysisRequest {
                content: &filtered.text,
                keywords: &request.keywords,
                url: request.url.as_str(),
                title: Some(title.as_str()),
                site_keywords: &site_keywords,
                mode: request.mode,
            })
            .await;

        info!(
            source = analysis.source.as_str(),
            matched_tokens = filtered.matched_tokens.len(),
            total_tokens = filtered.total_tokens,
            "Scrape completed"
        );

        Ok(ScrapeOutcome::Completed(Box::new(build_result(
            &page,
            title,
            request.keywords,
            &text,
            analysis,
        ))))
    }
}

/// Page title, else the Open Graph title, else one derived from the host.
fn resolve_title(page: &FetchedPage) -> String {
    page.title()
        .map(str::to_string)
        .unwrap_or_else(|| host_title(&page.url))
}

fn host_title(url: &Url) -> String {
    let host = url.host_str().unwrap_or("").trim_start_matches("www.");
    let name = host.split('.').next().unwrap_or(host);
    let mut chars = name.chars();
    let name: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Untitled".to_string(),
    };
    format!("{} - Website Analysis", name)
}

fn build_result(
    page: &FetchedPage,
    title: String,
    keywords: Vec<String>,
    text: &str,
    analysis: Analysis,
) -> ScrapeResult {
    let fields = analysis.fields;
    let highlighted_content = excerpts(&fields.key_highlights);

    let mut result = ScrapeResult::new(page.url.as_str());
    result.title = Some(title);
    result.meta_description = page
        .metadata
        .description
        .clone()
        .or_else(|| page.metadata.og_description.clone());
    result.keywords = keywords;
    result.links = page.links.clone();
    result.highlighted_content = highlighted_content;
    result.og_data = page.metadata.og_data();
    result.raw_content =
        (!text.is_empty()).then(|| truncate_chars(text, RAW_CONTENT_MAX_CHARS));
    result.ai_summary = Some(fields.source_summary);
    result.short_summary = fields.short_summary;
    result.verified_origin = fields.verified_origin;
    result.future_forecast = fields.future_forecast;
    result.relevance_score = fields.relevance_score;
    result.social_posts = (!fields.social_posts.is_empty()).then_some(fields.social_posts);
    result.key_highlights = (!fields.key_highlights.is_empty()).then_some(fields.key_highlights);
    result.analysis_source = Some(analysis.source);
    result
}

/// Highlights in order of appearance: the first two high, the next three
/// medium, the rest low.
fn excerpts(highlights: &[String]) -> Vec<HighlightedExcerpt> {
    highlights
        .iter()
        .filter(|h| !h.trim().is_empty())
        .enumerate()
        .map(|(idx, text)| {
            let level = match idx {
                0..=1 => ImportanceLevel::High,
                2..=4 => ImportanceLevel::Medium,
                _ => ImportanceLevel::Low,
            };
            HighlightedExcerpt {
                text: text.clone(),
                importance: Some(Importance::Level(level)),
            }
        })
        .collect()
}
