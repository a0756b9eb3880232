use serde::Serialize;
use std::collections::BTreeSet;
use utoipa::ToSchema;

use crate::extractor::model::split_paragraphs;

/// Shortest word kept when a multi-word keyword is split into tokens.
const MIN_TOKEN_LEN: usize = 3;

/// Requested keywords were not found anywhere on the page.
///
/// This is an outcome, not an error: it is rendered to the user as "no
/// relevant content" rather than as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NoMatch {
    pub url: String,
    pub keywords: Vec<String>,
}

impl NoMatch {
    pub fn message(&self) -> String {
        let quoted: Vec<String> = self.keywords.iter().map(|k| format!("\"{}\"", k)).collect();
        format!(
            "No relevant content found for {} on {}.",
            quoted.join(", "),
            self.url
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredContent {
    pub text: String,
    /// Tokens that occurred in the title or the body, lowercased.
    pub matched_tokens: Vec<String>,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Content(FilteredContent),
    NoMatch(NoMatch),
}

/// Splits keywords into lowercased search tokens.
///
/// A multi-word keyword contributes its words longer than two characters; if
/// none qualify the whole phrase is used. A single word is its own token.
/// Duplicates are dropped, first occurrence wins.
pub fn keyword_tokens(keywords: &[String]) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for keyword in keywords {
        let words: Vec<&str> = keyword.split_whitespace().collect();
        let mut candidates: Vec<String> = if words.len() > 1 {
            words
                .iter()
                .filter(|w| w.chars().count() >= MIN_TOKEN_LEN)
                .map(|w| w.to_lowercase())
                .collect()
        } else {
            words.iter().map(|w| w.to_lowercase()).collect()
        };
        if candidates.is_empty() && !words.is_empty() {
            candidates.push(words.join(" ").to_lowercase());
        }
        for token in candidates {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
    }
    tokens
}

/// Narrows `content` to the paragraphs relevant to `keywords`.
///
/// With no keywords the content comes back unchanged. If no token occurs in
/// the title or the body the outcome is [`FilterOutcome::NoMatch`]. Otherwise
/// every paragraph containing a matched token is kept together with its
/// immediate neighbours, in original order and without repeats.
pub fn filter_by_keywords(
    content: &str,
    keywords: &[String],
    title: Option<&str>,
    url: &str,
) -> FilterOutcome {
    let tokens = keyword_tokens(keywords);
    if tokens.is_empty() {
        return FilterOutcome::Content(FilteredContent {
            text: content.to_string(),
            matched_tokens: Vec::new(),
            total_tokens: 0,
        });
    }

    let haystack = format!("{}\n{}", title.unwrap_or(""), content).to_lowercase();
    let matched: Vec<String> = tokens
        .iter()
        .filter(|t| haystack.contains(t.as_str()))
        .cloned()
        .collect();

    if matched.is_empty() {
        return FilterOutcome::NoMatch(NoMatch {
            url: url.to_string(),
            keywords: keywords.to_vec(),
        });
    }

    let paragraphs = split_paragraphs(content);
    let mut selected = BTreeSet::new();
    for (idx, paragraph) in paragraphs.iter().enumerate() {
        let lower = paragraph.to_lowercase();
        if matched.iter().any(|t| lower.contains(t.as_str())) {
            if idx > 0 {
                selected.insert(idx - 1);
            }
            selected.insert(idx);
            if idx + 1 < paragraphs.len() {
                selected.insert(idx + 1);
            }
        }
    }

    // Only the title matched: nothing in the body to narrow to.
    let text = if selected.is_empty() {
        content.to_string()
    } else {
        selected
            .into_iter()
            .map(|idx| paragraphs[idx])
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    FilterOutcome::Content(FilteredContent {
        text,
        matched_tokens: matched,
        total_tokens: tokens.len(),
    })
}
