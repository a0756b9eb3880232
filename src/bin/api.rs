use anyhow::Result;
use scrapemaster::{
    analysis::{AnalysisEngine, GeminiClient, GenerationParams, TextGenerator},
    app_state::AppState,
    config::Config,
    fetcher::{FirecrawlClient, PageFetcher},
    routes::{DOCS_PATH, build_router},
    scrapes::ScrapePipeline,
    telemetry::init_tracing,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(config.database_url())
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let fetcher: Option<Arc<dyn PageFetcher>> = match FirecrawlClient::new(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Scrape endpoint will answer 503");
            None
        }
    };

    let generator: Option<Arc<dyn TextGenerator>> = match GeminiClient::new(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Analysis limited to the deterministic summarizer");
            None
        }
    };

    let engine = AnalysisEngine::new(
        generator,
        GenerationParams {
            max_output_tokens: config.gemini_max_output_tokens(),
            ..GenerationParams::default()
        },
    );
    let pipeline = ScrapePipeline::new(fetcher, engine);
    let app = build_router(AppState::new(pool, pipeline, config.jwt_secret()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %config.bind_addr(), docs = DOCS_PATH, "ScrapeMaster API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
