//! Turns a free-form model reply into [`AnalysisFields`].

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::analysis::AnalysisFields;
use crate::analysis::fallback::{self, SummaryInput};
use crate::analysis::prompt::Section;
use crate::entities::SocialPosts;

const MIN_HIGHLIGHT_CHARS: usize = 5;
const MAX_HIGHLIGHTS: usize = 10;

/// A section header at the start of a line: optional bold or markdown
/// heading marker, the label, then a colon and/or closing marker, or the
/// end of the line.
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    let mut labels: Vec<&str> = Section::ALL
        .iter()
        .flat_map(|s| s.aliases().iter().copied())
        .collect();
    labels.sort_by_key(|l| std::cmp::Reverse(l.len()));
    let alternation = labels
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?im)^[ \t]*(?:\*\*|__|#{{1,6}}[ \t]*(?:\*\*)?)?[ \t]*({})[ \t]*(?::[ \t]*(?:\*\*|__)?|(?:\*\*|__)[ \t]*:?|$)",
        alternation
    ))
    .unwrap()
});
static LIST_ITEM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*(?:\d+[.)]|[-*•])[ \t]+(.+)$").unwrap());
static SCORE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:score[ \t]*:?[ \t]*|^[ \t]*)(\d+(?:\.\d+)?)[ \t]*/[ \t]*10\b").unwrap()
});
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\[(?:write|create|compose|insert|add)\b[^\]]*\]").unwrap()
});
static SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*(?:-{3,}|\*{3,}|_{3,})[ \t]*$").unwrap());

/// Sections located in a reply. Everything is optional; nothing is
/// fabricated here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSections {
    pub source_summary: Option<String>,
    pub short_summary: Option<String>,
    pub key_highlights: Vec<String>,
    pub verified_origin: Option<String>,
    pub future_forecast: Option<String>,
    pub relevance_score: Option<f32>,
    pub social_posts: SocialPosts,
}

impl ParsedSections {
    /// Merges parsed sections with the deterministic summary. When the
    /// reply lacks a source summary the deterministic fields are the base
    /// and any parsed field overrides its counterpart.
    pub fn into_fields(self, input: &SummaryInput<'_>) -> AnalysisFields {
        let Some(source_summary) = self.source_summary else {
            let mut base = fallback::summarize(input);
            if let Some(short) = self.short_summary {
                base.short_summary = Some(short);
            }
            if !self.key_highlights.is_empty() {
                base.key_highlights = self.key_highlights;
            }
            if let Some(origin) = self.verified_origin {
                base.verified_origin = Some(origin);
            }
            if let Some(forecast) = self.future_forecast {
                base.future_forecast = Some(forecast);
            }
            if self.relevance_score.is_some() {
                base.relevance_score = self.relevance_score;
            }
            let posts = self.social_posts;
            base.social_posts = SocialPosts {
                linkedin: posts.linkedin.or(base.social_posts.linkedin),
                twitter: posts.twitter.or(base.social_posts.twitter),
                instagram: posts.instagram.or(base.social_posts.instagram),
                facebook: posts.facebook.or(base.social_posts.facebook),
            };
            return base;
        };

        AnalysisFields {
            source_summary,
            short_summary: self.short_summary,
            key_highlights: self.key_highlights,
            verified_origin: self.verified_origin,
            future_forecast: self.future_forecast,
            relevance_score: self.relevance_score,
            social_posts: self.social_posts,
        }
    }
}

/// Parses `reply` and completes it from the deterministic summary where the
/// reply is missing its source summary.
pub fn parse_reply(reply: &str, input: &SummaryInput<'_>) -> AnalysisFields {
    let has_keywords = !input.keywords.is_empty();
    parse_sections(reply, has_keywords).into_fields(input)
}

/// Locates every known section in `reply`. The first occurrence of a header
/// wins; a section runs until the next recognized header.
pub fn parse_sections(reply: &str, has_keywords: bool) -> ParsedSections {
    let headers: Vec<(Section, usize, usize)> = HEADER_REGEX
        .captures_iter(reply)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let section = section_for_label(caps.get(1)?.as_str())?;
            Some((section, whole.start(), whole.end()))
        })
        .collect();

    let mut bodies: HashMap<Section, &str> = HashMap::new();
    for (idx, (section, _, body_start)) in headers.iter().enumerate() {
        let body_end = headers
            .get(idx + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(reply.len());
        bodies.entry(*section).or_insert(&reply[*body_start..body_end]);
    }

    let text = |section: Section| bodies.get(&section).and_then(|body| clean_body(body));
    let post = |section: Section| {
        bodies
            .get(&section)
            .map(|body| PLACEHOLDER_REGEX.replace_all(body, "").into_owned())
            .and_then(|body| clean_body(&body))
    };

    ParsedSections {
        source_summary: text(Section::SourceSummary),
        short_summary: text(Section::ShortSummary),
        key_highlights: bodies
            .get(&Section::KeyHighlights)
            .map(|body| list_items(body))
            .unwrap_or_default(),
        verified_origin: text(Section::VerifiedOrigin),
        future_forecast: text(Section::FutureForecast),
        relevance_score: if has_keywords {
            bodies.get(&Section::RelevanceScore).and_then(|body| score(body))
        } else {
            None
        },
        social_posts: SocialPosts {
            linkedin: post(Section::LinkedinPost),
            twitter: post(Section::TwitterPost),
            instagram: post(Section::InstagramPost),
            facebook: post(Section::FacebookPost),
        },
    }
}

fn section_for_label(label: &str) -> Option<Section> {
    let upper = label.to_uppercase();
    Section::ALL
        .into_iter()
        .find(|s| s.aliases().iter().any(|a| *a == upper))
}

/// Trims a section body and drops horizontal rules; `None` if nothing is left.
fn clean_body(body: &str) -> Option<String> {
    let body = SEPARATOR_REGEX.replace_all(body, "");
    let body = body.trim().trim_start_matches(':').trim();
    if body.is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}

fn list_items(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| LIST_ITEM_REGEX.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("**", "").trim().to_string())
        .filter(|item| item.chars().count() >= MIN_HIGHLIGHT_CHARS)
        .take(MAX_HIGHLIGHTS)
        .collect()
}

fn score(body: &str) -> Option<f32> {
    let caps = SCORE_REGEX.captures(body.trim())?;
    let value: f32 = caps.get(1)?.as_str().parse().ok()?;
    Some(value.clamp(0.0, 10.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(keywords: &'a [String]) -> SummaryInput<'a> {
        SummaryInput {
            content: "The page body has a paragraph that is long enough to summarize.",
            keywords,
            title: Some("Example"),
            url: "https://example.com",
        }
    }

    #[test]
    fn test_summary_and_numbered_highlights() {
        let reply = "**SOURCE SUMMARY:** Foo bar.\n**KEY HIGHLIGHTS:**\n1. Fact one.\n2. Fact two.";
        let fields = parse_reply(reply, &input(&[]));

        assert_eq!(fields.source_summary, "Foo bar.");
        assert_eq!(fields.key_highlights, vec!["Fact one.", "Fact two."]);
        assert_eq!(fields.short_summary, None);
        assert!(fields.social_posts.is_empty());
    }

    #[test]
    fn test_full_reply() {
        let reply = "\
**SOURCE SUMMARY:**
Battery prices fell sharply.

Automakers responded by cutting prices.

**SHORT SUMMARY:** Cheaper batteries, cheaper cars.

**KEY HIGHLIGHTS:**
- **Prices** fell 20% year over year
* Lithium supply grew
- ok

**VERIFIED ORIGIN:** Lithium-ion cells were commercialized in 1991.
---
**FUTURE FORECAST:** Prices keep falling through 2030.
**RELEVANCE SCORE:** Score: 8/10 - closely matches the keywords.
**LINKEDIN POST:** Big news for EV buyers.
**TWITTER POST:** [Write a tweet under 280 characters with 2-3 hashtags]
**INSTAGRAM POST:** Charging ahead ⚡ #EV
**FACEBOOK POST:** What do you think about cheaper EVs?";
        let keywords = vec!["battery".to_string()];
        let fields = parse_reply(reply, &input(&keywords));

        assert_eq!(
            fields.source_summary,
            "Battery prices fell sharply.\n\nAutomakers responded by cutting prices."
        );
        assert_eq!(fields.short_summary.as_deref(), Some("Cheaper batteries, cheaper cars."));
        assert_eq!(
            fields.key_highlights,
            vec!["Prices fell 20% year over year", "Lithium supply grew"]
        );
        assert_eq!(
            fields.verified_origin.as_deref(),
            Some("Lithium-ion cells were commercialized in 1991.")
        );
        assert_eq!(
            fields.future_forecast.as_deref(),
            Some("Prices keep falling through 2030.")
        );
        assert_eq!(fields.relevance_score, Some(8.0));
        assert_eq!(fields.social_posts.linkedin.as_deref(), Some("Big news for EV buyers."));
        assert_eq!(fields.social_posts.twitter, None);
        assert_eq!(fields.social_posts.instagram.as_deref(), Some("Charging ahead ⚡ #EV"));
        assert!(fields.social_posts.facebook.is_some());
    }

    #[test]
    fn test_heading_style_headers_and_first_occurrence_wins() {
        let reply = "## Source Summary\nFirst body.\n\n## Short Summary\nShort.\n\n## SOURCE SUMMARY\nSecond body.";
        let sections = parse_sections(reply, false);
        assert_eq!(sections.source_summary.as_deref(), Some("First body."));
        assert_eq!(sections.short_summary.as_deref(), Some("Short."));
    }

    #[test]
    fn test_missing_source_summary_uses_fallback_overlay() {
        let reply = "**SHORT SUMMARY:** Model short.\n**FUTURE FORECAST:** Model forecast.";
        let keywords: Vec<String> = Vec::new();
        let fields = parse_reply(reply, &input(&keywords));
        let fallback = fallback::summarize(&input(&keywords));

        assert_eq!(fields.source_summary, fallback.source_summary);
        assert_eq!(fields.short_summary.as_deref(), Some("Model short."));
        assert_eq!(fields.future_forecast.as_deref(), Some("Model forecast."));
        assert_eq!(fields.verified_origin, fallback.verified_origin);
        assert_eq!(fields.social_posts, fallback.social_posts);
    }

    #[test]
    fn test_unstructured_reply_is_entirely_fallback() {
        let keywords: Vec<String> = Vec::new();
        let fields = parse_reply("I cannot help with that.", &input(&keywords));
        assert_eq!(fields, fallback::summarize(&input(&keywords)));
    }

    #[test]
    fn test_score_is_clamped_and_requires_keywords() {
        let reply = "**SOURCE SUMMARY:** S.\n**RELEVANCE SCORE:** Score: 14/10";
        assert_eq!(parse_sections(reply, true).relevance_score, Some(10.0));
        assert_eq!(parse_sections(reply, false).relevance_score, None);

        let bare = "**SOURCE SUMMARY:** S.\n**RELEVANCE SCORE:** 7.5/10 because reasons";
        assert_eq!(parse_sections(bare, true).relevance_score, Some(7.5));
    }

    #[test]
    fn test_highlights_capped_at_ten() {
        let items: String = (1..=14).map(|i| format!("{}. Highlight number {}\n", i, i)).collect();
        let reply = format!("**SOURCE SUMMARY:** S.\n**KEY HIGHLIGHTS:**\n{}", items);
        let sections = parse_sections(&reply, false);
        assert_eq!(sections.key_highlights.len(), MAX_HIGHLIGHTS);
        assert_eq!(sections.key_highlights[0], "Highlight number 1");
    }

    #[test]
    fn test_label_inside_sentence_is_not_a_header() {
        let reply = "**SOURCE SUMMARY:** The short summary: nothing new.";
        let sections = parse_sections(reply, false);
        assert_eq!(
            sections.source_summary.as_deref(),
            Some("The short summary: nothing new.")
        );
        assert_eq!(sections.short_summary, None);
    }
}
