use serde::{Deserialize, Serialize};
use url::Url;

use crate::entities::{Link, OgData};

/// Body of `POST /v1/scrape`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirecrawlScrapeRequest<'a> {
    pub url: &'a str,
    pub formats: Vec<&'static str>,
    pub only_main_content: bool,
    pub exclude_tags: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct FirecrawlScrapeResponse {
    #[serde(default)]
    pub success: bool,
    pub data: Option<FirecrawlScrapeData>,
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FirecrawlScrapeData {
    pub markdown: Option<String>,
    pub html: Option<String>,
    #[serde(default)]
    pub metadata: PageMetadata,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Page metadata as reported by FireCrawl.
///
/// FireCrawl sometimes reports `keywords` and the Open Graph fields as arrays
/// when a page repeats the meta tag, so those go through `one_or_many`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default, deserialize_with = "one_or_many")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub keywords: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub og_title: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub og_description: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub og_image: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub og_url: Option<String>,
}

impl PageMetadata {
    pub fn og_data(&self) -> Option<OgData> {
        let og = OgData {
            title: self.og_title.clone(),
            description: self.og_description.clone(),
            image: self.og_image.clone(),
            url: self.og_url.clone(),
        };
        (!og.is_empty()).then_some(og)
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let value = Option::<OneOrMany>::deserialize(deserializer)?;
    let joined = match value {
        Some(OneOrMany::One(s)) => Some(s),
        Some(OneOrMany::Many(v)) => v.into_iter().find(|s| !s.trim().is_empty()),
        None => None,
    };
    Ok(joined
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// The body a page is analysed from, tagged with its format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBody<'a> {
    Markdown(&'a str),
    Html(&'a str),
}

/// A page as returned by the content fetcher.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub markdown: Option<String>,
    pub html: Option<String>,
    pub metadata: PageMetadata,
    pub links: Vec<Link>,
}

impl FetchedPage {
    /// Markdown when present, else the HTML.
    pub fn body(&self) -> PageBody<'_> {
        match (self.markdown.as_deref(), self.html.as_deref()) {
            (Some(markdown), _) if !markdown.trim().is_empty() => PageBody::Markdown(markdown),
            (_, Some(html)) if !html.trim().is_empty() => PageBody::Html(html),
            _ => PageBody::Markdown(""),
        }
    }

    /// The page's `<meta name="keywords">`, split on commas.
    pub fn site_keywords(&self) -> Vec<&str> {
        self.metadata
            .keywords
            .as_deref()
            .map(|k| k.split(',').map(str::trim).filter(|k| !k.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata
            .title
            .as_deref()
            .or(self.metadata.og_title.as_deref())
    }
}
