pub mod scrape;

pub use scrape::{ScrapeRepository, ScrapeRepositoryTrait};
