//! Deterministic summarizer.
//!
//! Produces every analysis field from the page text alone. Output is a pure
//! function of the input, so it doubles as the fallback whenever the model
//! path is unavailable or returns something unusable.

use url::Url;

use crate::analysis::AnalysisFields;
use crate::entities::SocialPosts;
use crate::extractor::keywords::keyword_tokens;
use crate::extractor::model::split_paragraphs;

const MIN_PARAGRAPH_CHARS: usize = 40;
const SUMMARY_PARAGRAPHS: usize = 3;
const SUMMARY_MAX_CHARS: usize = 1500;
const SHORT_SUMMARY_MAX_CHARS: usize = 280;
const MAX_HIGHLIGHTS: usize = 8;
const HIGHLIGHT_MIN_CHARS: usize = 30;
const HIGHLIGHT_MAX_CHARS: usize = 300;
const MAX_HASHTAGS: usize = 3;

const LINKEDIN_MAX_CHARS: usize = 600;
const TWITTER_MAX_CHARS: usize = 280;
const INSTAGRAM_MAX_CHARS: usize = 300;
const FACEBOOK_MAX_CHARS: usize = 500;

/// Paragraphs starting with one of these (lowercased) are navigation or
/// page chrome, not content.
const BOILERPLATE_PREFIXES: &[&str] = &[
    "menu",
    "cookie",
    "we use cookies",
    "accept all",
    "sign in",
    "log in",
    "subscribe",
    "advertisement",
    "share this",
    "follow us",
    "copyright",
    "©",
    "all rights reserved",
    "related articles",
    "read more",
    "skip to",
];

#[derive(Debug, Clone)]
pub struct SummaryInput<'a> {
    pub content: &'a str,
    pub keywords: &'a [String],
    pub title: Option<&'a str>,
    pub url: &'a str,
}

impl SummaryInput<'_> {
    /// What the page is about: its title, else the keywords, else its host.
    fn subject(&self) -> String {
        if let Some(title) = self.title.map(str::trim).filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        if !self.keywords.is_empty() {
            return self.keywords.join(", ");
        }
        self.host()
    }

    fn host(&self) -> String {
        Url::parse(self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
            .unwrap_or_else(|| self.url.to_string())
    }
}

/// Summarizes `input` without a model.
pub fn summarize(input: &SummaryInput<'_>) -> AnalysisFields {
    let paragraphs = substantive_paragraphs(input.content);
    let subject = input.subject();
    let relevance_score = relevance(input);

    if paragraphs.is_empty() {
        let message = format!(
            "No substantial text content could be extracted from {}.",
            subject
        );
        return AnalysisFields {
            source_summary: message.clone(),
            short_summary: Some(message),
            key_highlights: Vec::new(),
            verified_origin: Some(origin_note(input, &subject)),
            future_forecast: Some(forecast_note(input, &subject)),
            relevance_score,
            social_posts: SocialPosts::default(),
        };
    }

    let joined = paragraphs
        .iter()
        .take(SUMMARY_PARAGRAPHS)
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n");
    let source_summary = truncate_on_word(&joined, SUMMARY_MAX_CHARS).to_string();
    let short_summary = short_summary(paragraphs[0]);
    let key_highlights = highlights(&paragraphs);
    let social_posts = social_posts(input, &source_summary, &short_summary);

    AnalysisFields {
        source_summary,
        short_summary: Some(short_summary),
        key_highlights,
        verified_origin: Some(origin_note(input, &subject)),
        future_forecast: Some(forecast_note(input, &subject)),
        relevance_score,
        social_posts,
    }
}

fn substantive_paragraphs(content: &str) -> Vec<&str> {
    split_paragraphs(content)
        .into_iter()
        .map(|p| p.trim_start_matches('#').trim())
        .filter(|p| p.chars().count() >= MIN_PARAGRAPH_CHARS)
        .filter(|p| {
            let lower = p.to_lowercase();
            !BOILERPLATE_PREFIXES.iter().any(|b| lower.starts_with(b))
        })
        .collect()
}

/// Byte spans of the sentences in `text`. A sentence ends at `.`, `!` or
/// `?` followed by whitespace or the end of the text.
fn sentence_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let at_boundary = matches!(c, '.' | '!' | '?')
            && chars.peek().map(|(_, next)| next.is_whitespace()).unwrap_or(true);
        if at_boundary {
            let end = idx + c.len_utf8();
            push_trimmed_span(text, start, end, &mut spans);
            start = end;
        }
    }
    push_trimmed_span(text, start, text.len(), &mut spans);
    spans
}

fn push_trimmed_span(text: &str, start: usize, end: usize, spans: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trailing = slice.len() - slice.trim_end().len();
    if start + leading < end - trailing {
        spans.push((start + leading, end - trailing));
    }
}

/// Whole leading sentences of `paragraph` up to the short-summary limit; a
/// first sentence over the limit is cut at a word boundary instead. Always a
/// prefix of `paragraph`.
fn short_summary(paragraph: &str) -> String {
    let mut end = 0;
    for (_, sentence_end) in sentence_spans(paragraph) {
        if paragraph[..sentence_end].chars().count() > SHORT_SUMMARY_MAX_CHARS {
            break;
        }
        end = sentence_end;
    }

    if end == 0 {
        truncate_on_word(paragraph, SHORT_SUMMARY_MAX_CHARS).to_string()
    } else {
        paragraph[..end].to_string()
    }
}

fn highlights(paragraphs: &[&str]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for paragraph in paragraphs {
        for (start, end) in sentence_spans(paragraph) {
            let sentence = &paragraph[start..end];
            let len = sentence.chars().count();
            if (HIGHLIGHT_MIN_CHARS..=HIGHLIGHT_MAX_CHARS).contains(&len)
                && !out.iter().any(|h| h == sentence)
            {
                out.push(sentence.to_string());
                if out.len() == MAX_HIGHLIGHTS {
                    return out;
                }
            }
        }
    }

    if out.is_empty() {
        out = paragraphs
            .iter()
            .take(MAX_HIGHLIGHTS)
            .map(|p| truncate_on_word(p, HIGHLIGHT_MAX_CHARS).to_string())
            .collect();
    }
    out
}

/// Share of keyword tokens present in the title or content, on a 0-10 scale
/// with one decimal. `None` without keywords.
fn relevance(input: &SummaryInput<'_>) -> Option<f32> {
    let tokens = keyword_tokens(input.keywords);
    if tokens.is_empty() {
        return None;
    }
    let haystack = format!("{}\n{}", input.title.unwrap_or(""), input.content).to_lowercase();
    let matched = tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .count();
    let score = 10.0 * matched as f32 / tokens.len() as f32;
    Some((score * 10.0).round() / 10.0)
}

fn origin_note(input: &SummaryInput<'_>, subject: &str) -> String {
    format!(
        "{} is published on {}. The background of this topic could not be verified \
         without model analysis, so this summary relies on the page text alone.",
        subject,
        input.host()
    )
}

fn forecast_note(input: &SummaryInput<'_>, subject: &str) -> String {
    if input.keywords.is_empty() {
        format!(
            "No model-backed forecast is available for {}. Revisit the source for \
             updates as the story develops.",
            subject
        )
    } else {
        format!(
            "Coverage of {} on {} suggests ongoing interest in the topic. No \
             model-backed forecast is available for this scrape.",
            input.keywords.join(", "),
            input.host()
        )
    }
}

fn social_posts(input: &SummaryInput<'_>, summary: &str, short: &str) -> SocialPosts {
    let tags = hashtags(input.keywords);

    let mut linkedin = format!(
        "{}\n\nSource: {}",
        ellipsize(summary, LINKEDIN_MAX_CHARS),
        input.url
    );
    if !tags.is_empty() {
        linkedin.push_str("\n\n");
        linkedin.push_str(&tags);
    }

    let mut instagram = ellipsize(short, INSTAGRAM_MAX_CHARS);
    if !tags.is_empty() {
        instagram.push_str("\n\n");
        instagram.push_str(&tags);
    }

    let facebook = format!(
        "{}\n\nRead more: {}",
        ellipsize(summary, FACEBOOK_MAX_CHARS),
        input.url
    );

    SocialPosts {
        linkedin: Some(linkedin),
        twitter: Some(tweet(short, input.url, &tags)),
        instagram: Some(instagram),
        facebook: Some(facebook),
    }
}

/// Short summary plus link (and hashtags when they fit), within the
/// platform limit.
fn tweet(short: &str, url: &str, tags: &str) -> String {
    let with_tags = format!("{} {}", url, tags);
    let suffix = if tags.is_empty() || TWITTER_MAX_CHARS.saturating_sub(with_tags.chars().count()) < 40
    {
        url.to_string()
    } else {
        with_tags
    };

    let available = TWITTER_MAX_CHARS.saturating_sub(suffix.chars().count() + 1);
    let post = if available == 0 {
        suffix
    } else {
        format!("{} {}", ellipsize(short, available), suffix)
    };
    ellipsize(&post, TWITTER_MAX_CHARS)
}

/// `#CamelCase` tags from the keywords, alphanumerics only.
fn hashtags(keywords: &[String]) -> String {
    keywords
        .iter()
        .filter_map(|keyword| {
            let tag: String = keyword
                .split_whitespace()
                .map(|word| {
                    let word: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                        None => String::new(),
                    }
                })
                .collect();
            if tag.is_empty() { None } else { Some(format!("#{}", tag)) }
        })
        .take(MAX_HASHTAGS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prefix of `text` of at most `max_chars` characters, cut at the last
/// whitespace when possible.
fn truncate_on_word(text: &str, max_chars: usize) -> &str {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };
    let head = &text[..cut];
    match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => head[..space].trim_end(),
        _ => head,
    }
}

/// Like [`truncate_on_word`] but marks a cut with an ellipsis, staying
/// within `max_chars`.
fn ellipsize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    format!("{}…", truncate_on_word(text, max_chars.saturating_sub(1)))
}
