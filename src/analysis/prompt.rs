use crate::entities::truncate_chars;

/// Reply prefix the model uses to say nothing on the page matches the keywords.
pub const NO_MATCH_SENTINEL: &str = "NO_RELEVANT_CONTENT";

/// Characters of page content sent to the model.
pub const MAX_PROMPT_CONTENT_CHARS: usize = 10_000;

/// Sections the model is asked to produce, in prompt order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    SourceSummary,
    ShortSummary,
    KeyHighlights,
    VerifiedOrigin,
    FutureForecast,
    RelevanceScore,
    LinkedinPost,
    TwitterPost,
    InstagramPost,
    FacebookPost,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::SourceSummary,
        Section::ShortSummary,
        Section::KeyHighlights,
        Section::VerifiedOrigin,
        Section::FutureForecast,
        Section::RelevanceScore,
        Section::LinkedinPost,
        Section::TwitterPost,
        Section::InstagramPost,
        Section::FacebookPost,
    ];

    /// Header label used in the prompt.
    pub fn label(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Header labels accepted when parsing a reply. The first is canonical.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Section::SourceSummary => &["SOURCE SUMMARY", "DETAILED SUMMARY"],
            Section::ShortSummary => &["SHORT SUMMARY", "BRIEF SUMMARY"],
            Section::KeyHighlights => &["KEY HIGHLIGHTS", "HIGHLIGHTS"],
            Section::VerifiedOrigin => &["VERIFIED ORIGIN", "HISTORICAL ORIGIN"],
            Section::FutureForecast => &["FUTURE FORECAST", "CURRENT STATE AND FORECAST"],
            Section::RelevanceScore => &["RELEVANCE SCORE", "KEYWORD RELEVANCE"],
            Section::LinkedinPost => &["LINKEDIN POST"],
            Section::TwitterPost => &["TWITTER POST", "X POST", "TWITTER/X POST"],
            Section::InstagramPost => &["INSTAGRAM POST", "INSTAGRAM CAPTION"],
            Section::FacebookPost => &["FACEBOOK POST"],
        }
    }

    fn instruction(&self) -> &'static str {
        match self {
            Section::SourceSummary => {
                "A thorough summary of the content in 3-5 paragraphs, covering the main points and supporting details."
            }
            Section::ShortSummary => "Two or three sentences capturing the essence of the content.",
            Section::KeyHighlights => {
                "8-10 numbered bullet points (1., 2., ...) with the most important facts, figures and claims."
            }
            Section::VerifiedOrigin => {
                "The historical origin and background of the topic: how it started, key milestones and who was involved."
            }
            Section::FutureForecast => {
                "The current state of the topic and a reasoned forecast of where it is heading over the next few years."
            }
            Section::RelevanceScore => {
                "Score: N/10 on its own line, where N rates how well the content matches the keywords, then one sentence of justification."
            }
            Section::LinkedinPost => "[Write a professional LinkedIn post of 3-4 short paragraphs]",
            Section::TwitterPost => "[Write a tweet under 280 characters with 2-3 hashtags]",
            Section::InstagramPost => "[Write an engaging Instagram caption with emojis and hashtags]",
            Section::FacebookPost => "[Write a conversational Facebook post that invites discussion]",
        }
    }
}

/// Builds the analysis prompt sent to the model. `site_keywords` are the
/// page's own meta keywords and only give the model context.
pub fn build_prompt(
    content: &str,
    keywords: &[String],
    url: &str,
    title: Option<&str>,
    site_keywords: &[&str],
) -> String {
    let has_keywords = !keywords.is_empty();
    let mut prompt = String::new();

    prompt.push_str("You are an expert research analyst. ");
    if has_keywords {
        let quoted: Vec<String> = keywords.iter().map(|k| format!("\"{}\"", k)).collect();
        prompt.push_str(&format!(
            "Focus your analysis specifically on content related to these keywords: {}. \
             Ignore parts of the page that are unrelated to them.\n\n",
            quoted.join(", ")
        ));
    } else {
        prompt.push_str("Analyze the main content of this web page.\n\n");
    }

    prompt.push_str(&format!("URL: {}\n", url));
    prompt.push_str(&format!(
        "Title: {}\n",
        title.filter(|t| !t.trim().is_empty()).unwrap_or("Unknown")
    ));
    if !site_keywords.is_empty() {
        prompt.push_str(&format!("Site keywords: {}\n", site_keywords.join(", ")));
    }
    prompt.push('\n');
    prompt.push_str("CONTENT:\n");
    prompt.push_str(&truncate_chars(content, MAX_PROMPT_CONTENT_CHARS));
    prompt.push_str("\n\n");

    if has_keywords {
        prompt.push_str(&format!(
            "If none of the content relates to the keywords, reply with exactly {} and nothing else.\n\n",
            NO_MATCH_SENTINEL
        ));
    }

    prompt.push_str("Respond using exactly these section headers, in this order:\n\n");
    for section in Section::ALL {
        if section == Section::RelevanceScore && !has_keywords {
            continue;
        }
        prompt.push_str(&format!("**{}:** {}\n", section.label(), section.instruction()));
    }

    prompt
}

/// True when the reply starts with the no-match sentinel.
pub fn is_no_match_reply(reply: &str) -> bool {
    reply
        .trim_start()
        .trim_start_matches(['*', '`', '"'])
        .starts_with(NO_MATCH_SENTINEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_with_keywords_focuses_and_asks_for_score() {
        let keywords = vec!["electric vehicles".to_string(), "Tesla".to_string()];
        let prompt = build_prompt(
            "Body",
            &keywords,
            "https://example.com/ev",
            Some("EVs"),
            &["cars", "energy"],
        );

        assert!(prompt.contains("\"electric vehicles\", \"Tesla\""));
        assert!(prompt.contains("URL: https://example.com/ev"));
        assert!(prompt.contains("Title: EVs\nSite keywords: cars, energy\n"));
        assert!(prompt.contains("**RELEVANCE SCORE:**"));
        assert!(prompt.contains(NO_MATCH_SENTINEL));
        for section in Section::ALL {
            assert!(prompt.contains(section.label()), "missing {}", section.label());
        }
    }

    #[test]
    fn test_prompt_without_keywords_omits_score() {
        let prompt = build_prompt("Body", &[], "https://example.com", None, &[]);

        assert!(prompt.contains("Analyze the main content"));
        assert!(prompt.contains("Title: Unknown"));
        assert!(!prompt.contains("Site keywords"));
        assert!(!prompt.contains("RELEVANCE SCORE"));
        assert!(!prompt.contains(NO_MATCH_SENTINEL));
    }

    #[test]
    fn test_prompt_content_is_capped() {
        let content = "x".repeat(MAX_PROMPT_CONTENT_CHARS + 500);
        let prompt = build_prompt(&content, &[], "https://example.com", None, &[]);

        assert!(prompt.contains(&"x".repeat(MAX_PROMPT_CONTENT_CHARS)));
        assert!(!prompt.contains(&"x".repeat(MAX_PROMPT_CONTENT_CHARS + 1)));
    }

    #[test]
    fn test_no_match_reply_detection() {
        assert!(is_no_match_reply("NO_RELEVANT_CONTENT"));
        assert!(is_no_match_reply("  **NO_RELEVANT_CONTENT**"));
        assert!(!is_no_match_reply("**SOURCE SUMMARY:** NO_RELEVANT_CONTENT"));
    }
}
