pub mod cleaner;
pub mod keywords;
pub mod model;

pub use cleaner::clean_content;
pub use keywords::{FilterOutcome, FilteredContent, NoMatch, filter_by_keywords};

use crate::fetcher::FetchedPage;

/// Cleans the fetched page body (markdown, else HTML) into plain text.
pub fn extract_text(page: &FetchedPage) -> String {
    clean_content(page.body())
}
