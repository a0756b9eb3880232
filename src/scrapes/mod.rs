pub mod dtos;
pub mod handlers;
pub mod pipeline;

pub use pipeline::{PipelineError, ScrapeOutcome, ScrapePipeline};
