use axum::Router;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use scrapemaster::{
    analysis::{AnalysisEngine, GeminiClient, GenerationParams, TextGenerator},
    app_state::AppState,
    config::Config,
    fetcher::{FirecrawlClient, PageFetcher},
    routes::build_router,
    scrapes::ScrapePipeline,
};

pub const JWT_SECRET: &str = "integration-secret";

/// Config pointing both upstream APIs at the given base URLs.
pub fn test_config(firecrawl_base: Option<String>, gemini_base: Option<String>) -> Config {
    let mut config = Config::new("postgresql://dummy", "127.0.0.1:0", JWT_SECRET);
    if let Some(base) = firecrawl_base {
        config = config.with_firecrawl(Some("fc-test-key"), base);
    }
    if let Some(base) = gemini_base {
        config = config.with_gemini(Some("g-test-key"), base, "gemini-1.5-flash");
    }
    config
}

/// The full router wired the way the `api` binary wires it. The pool is
/// lazy, so routes that touch the database must not be exercised.
pub fn test_app(config: &Config) -> Router {
    let fetcher = FirecrawlClient::new(config)
        .ok()
        .map(|c| Arc::new(c) as Arc<dyn PageFetcher>);
    let generator = GeminiClient::new(config)
        .ok()
        .map(|c| Arc::new(c) as Arc<dyn TextGenerator>);

    let pipeline = ScrapePipeline::new(
        fetcher,
        AnalysisEngine::new(generator, GenerationParams::default()),
    );
    let pool: Pool<Postgres> =
        Pool::<Postgres>::connect_lazy(config.database_url()).expect("Failed to create test pool");

    build_router(AppState::new(pool, pipeline, config.jwt_secret()))
}
