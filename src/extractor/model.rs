use regex::Regex;
use std::sync::LazyLock;

static SPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").unwrap());
static BLANK_LINES_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static PARAGRAPH_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Collapses runs of spaces, trims every line and leaves at most one blank
/// line between paragraphs.
pub fn normalize_whitespace(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let spaced = SPACE_REGEX.replace_all(&text, " ");

    let lines: Vec<&str> = spaced.lines().map(str::trim).collect();
    let joined = lines.join("\n");

    BLANK_LINES_REGEX
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

/// Splits text on blank lines into trimmed, non-empty paragraphs.
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK_REGEX
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        let text = "  Hello    world  \n\n\n\n  Test\t\tline  ";
        assert_eq!(normalize_whitespace(text), "Hello world\n\nTest line");
    }

    #[test]
    fn test_normalize_keeps_single_newlines() {
        assert_eq!(normalize_whitespace("a\nb\r\nc"), "a\nb\nc");
    }

    #[test]
    fn test_split_paragraphs() {
        let text = "First para\nstill first\n\n  \nSecond\n \nThird";
        assert_eq!(
            split_paragraphs(text),
            vec!["First para\nstill first", "Second", "Third"]
        );
    }
}
