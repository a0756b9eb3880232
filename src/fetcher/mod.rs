pub mod client;
pub mod errors;
pub mod links;
pub mod types;

pub use client::{FirecrawlClient, PageFetcher};
pub use errors::FetchError;
pub use types::{FetchedPage, PageBody, PageMetadata};

#[cfg(test)]
pub use client::MockPageFetcher;
