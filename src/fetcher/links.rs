use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use linkify::{LinkFinder, LinkKind};
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::entities::Link;

const MAX_LINKS: usize = 100;

static MARKDOWN_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\[([^\]\n]+)\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#).unwrap()
});

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Builds the outbound link list for a scraped page.
///
/// `upstream` is the raw link list reported by the extraction API. When it is
/// empty the links are discovered from the HTML anchors and the markdown
/// instead. Anchor text is looked up in the HTML first, then in the markdown.
pub fn build_links(
    page_url: &Url,
    upstream: &[String],
    html: Option<&str>,
    markdown: Option<&str>,
) -> Vec<Link> {
    let html_anchors = html.map(|h| html_anchors(h, page_url)).unwrap_or_default();
    let markdown_anchors = markdown
        .map(|m| markdown_anchors(m, page_url))
        .unwrap_or_default();

    let candidates: Vec<Url> = if upstream.is_empty() {
        let mut discovered: Vec<Url> = html_anchors.iter().map(|(u, _)| u.clone()).collect();
        discovered.extend(markdown_anchors.iter().map(|(u, _)| u.clone()));
        if let Some(markdown) = markdown {
            discovered.extend(bare_urls(markdown));
        }
        discovered
    } else {
        upstream
            .iter()
            .filter_map(|raw| page_url.join(raw.trim()).ok())
            .collect()
    };

    let mut text_by_url: HashMap<String, String> = HashMap::new();
    for (url, text) in html_anchors.into_iter().chain(markdown_anchors) {
        text_by_url.entry(url.to_string()).or_insert(text);
    }

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .filter(|u| seen.insert(u.to_string()))
        .take(MAX_LINKS)
        .map(|u| {
            let key = u.to_string();
            let text = text_by_url.get(&key).cloned().unwrap_or_else(|| key.clone());
            Link {
                kind: Some(link_kind(page_url, &u).to_string()),
                url: key,
                text,
            }
        })
        .collect()
}

fn html_anchors(html: &str, base: &Url) -> Vec<(Url, String)> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let url = base.join(href.trim()).ok()?;
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some((url, text))
        })
        .collect()
}

fn markdown_anchors(markdown: &str, base: &Url) -> Vec<(Url, String)> {
    MARKDOWN_LINK_REGEX
        .captures_iter(markdown)
        .filter(|caps| {
            // `![alt](src)` is an image, not a link
            let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
            start == 0 || !markdown[..start].ends_with('!')
        })
        .filter_map(|caps| {
            let url = base.join(&caps[2]).ok()?;
            let text = caps[1].trim().to_string();
            (!text.is_empty()).then_some((url, text))
        })
        .collect()
}

fn bare_urls(text: &str) -> Vec<Url> {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    finder
        .links(text)
        .filter_map(|link| Url::parse(link.as_str()).ok())
        .collect()
}

fn link_kind(page_url: &Url, target: &Url) -> &'static str {
    let normalize = |host: Option<&str>| host.map(|h| h.trim_start_matches("www.").to_lowercase());
    if normalize(page_url.host_str()) == normalize(target.host_str()) {
        "internal"
    } else {
        "external"
    }
}
