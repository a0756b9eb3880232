use html_escape::decode_html_entities;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

use crate::{
    extractor::model::{normalize_whitespace, split_paragraphs},
    fetcher::PageBody,
};

static MD_IMAGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static MD_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

static SKIP_LINK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*skip to (?:the )?(?:main )?(?:content|navigation|main|footer)\b.*$")
        .unwrap()
});
static DATE_BANNER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?im)^[ \t]*(?:(?:last[ \t]+)?updated|published|posted)?[ \t]*:?[ \t]*(?:on[ \t]+)?",
        r"(?:(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?[ \t]+)?",
        r"(?:",
        r"(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[ \t]+\d{1,2}(?:st|nd|rd|th)?,?[ \t]+\d{4}",
        r"|\d{1,2}[ \t]+(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?[ \t]+\d{4}",
        r"|\d{4}-\d{2}-\d{2}",
        r"|\d{1,2}/\d{1,2}/\d{2,4}",
        r")",
        r"(?:[ \t]*(?:,|at)?[ \t]*\d{1,2}:\d{2}(?:[ \t]*[ap]\.?m\.?)?(?:[ \t]+[a-z]{2,4})?)?[ \t]*$"
    ))
    .unwrap()
});
static LIVE_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:🔴[ \t]*)?(?:live|live now|live updates?|live blog|breaking|breaking news|updating)[ \t]*:?[ \t]*$")
        .unwrap()
});
static APPEAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:donate|make a (?:donation|contribution)|chip in",
        r"|support (?:our|independent|quality|local) (?:journalism|reporting|newsroom|news)",
        r"|become a (?:member|supporter|patron))\b"
    ))
    .unwrap()
});

/// Longest paragraph still treated as a fundraising appeal.
const MAX_APPEAL_LEN: usize = 600;

/// Elements whose text never reaches the reader.
const SKIPPED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "head",
];

/// Elements that start a new paragraph.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Turns a fetched page body into plain text.
///
/// Markdown keeps its prose: images are removed, links keep only their text
/// and entities are decoded. HTML is parsed and reduced to its text with one
/// paragraph per block element. Both then lose skip-links, date banners, live
/// markers and fundraising appeals, with at most one blank line between
/// paragraphs.
pub fn clean_content(body: PageBody<'_>) -> String {
    let text = match body {
        PageBody::Markdown(markdown) => markdown_to_text(markdown),
        PageBody::Html(html) => html_to_text(html),
    };
    strip_boilerplate(&text)
}

fn markdown_to_text(markdown: &str) -> String {
    let text = MD_IMAGE_REGEX.replace_all(markdown, "");
    let text = MD_LINK_REGEX.replace_all(&text, "$1");
    decode_html_entities(&text).into_owned()
}

fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    collect_text(document.root_element(), &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            push_collapsed(out, text);
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            out.push_str("\n\n");
        }
        collect_text(child, out);
        if block {
            out.push_str("\n\n");
        }
    }
}

/// HTML source line breaks are ordinary whitespace.
fn push_collapsed(out: &mut String, text: &str) {
    let mut pending_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    if pending_space {
        out.push(' ');
    }
}

fn strip_boilerplate(text: &str) -> String {
    let text = SKIP_LINK_REGEX.replace_all(text, "");
    let text = DATE_BANNER_REGEX.replace_all(&text, "");
    let text = LIVE_MARKER_REGEX.replace_all(&text, "");

    let normalized = normalize_whitespace(&text);
    let kept: Vec<&str> = split_paragraphs(&normalized)
        .into_iter()
        .filter(|p| !is_fundraising_appeal(p))
        .collect();

    kept.join("\n\n")
}

fn is_fundraising_appeal(paragraph: &str) -> bool {
    paragraph.chars().count() <= MAX_APPEAL_LEN && APPEAL_REGEX.is_match(paragraph)
}
