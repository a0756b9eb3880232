use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    config::Config,
    fetcher::{
        errors::FetchError,
        links::build_links,
        types::{FetchedPage, FirecrawlScrapeRequest, FirecrawlScrapeResponse},
    },
};

const USER_AGENT: &str = "ScrapeMaster/0.1";
const EXCLUDED_TAGS: &[&str] = &[
    "nav", "footer", "header", "aside", "script", "style", "noscript", "iframe",
];

/// Anything that can turn a URL into page content.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`. `keywords` only annotate the request; they never narrow
    /// what is fetched.
    async fn fetch(&self, url: &Url, keywords: &[String]) -> Result<FetchedPage, FetchError>;
}

/// Client for the FireCrawl scrape endpoint.
#[derive(Clone)]
pub struct FirecrawlClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl FirecrawlClient {
    /// Builds a client from configuration. Fails when no API key is set.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let api_key = config
            .firecrawl_api_key()
            .ok_or(FetchError::MissingApiKey)?
            .to_string();

        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.firecrawl_base_url().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PageFetcher for FirecrawlClient {
    #[instrument(skip_all, fields(url = %url, keywords = ?keywords))]
    async fn fetch(&self, url: &Url, keywords: &[String]) -> Result<FetchedPage, FetchError> {
        let request = FirecrawlScrapeRequest {
            url: url.as_str(),
            formats: vec!["markdown", "html"],
            only_main_content: true,
            exclude_tags: EXCLUDED_TAGS.to_vec(),
        };

        let response = self
            .http
            .post(format!("{}/v1/scrape", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Http {
                status,
                message: upstream_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }

        let body: FirecrawlScrapeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        if !body.success {
            return Err(FetchError::Unsuccessful(
                body.error
                    .unwrap_or_else(|| "extraction reported failure".to_string()),
            ));
        }
        let data = body
            .data
            .ok_or_else(|| FetchError::Unsuccessful("response carried no data".to_string()))?;

        let links = build_links(url, &data.links, data.html.as_deref(), data.markdown.as_deref());

        debug!(
            markdown_len = data.markdown.as_ref().map(String::len).unwrap_or(0),
            html_len = data.html.as_ref().map(String::len).unwrap_or(0),
            links = links.len(),
            "Fetched page content"
        );

        Ok(FetchedPage {
            url: url.clone(),
            markdown: data.markdown,
            html: data.html,
            metadata: data.metadata,
            links,
        })
    }
}

/// Pulls `error` out of a JSON error body, if there is one.
fn upstream_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.as_str())
        .map(|s| s.to_string())
}
