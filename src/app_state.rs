use crate::{
    auth::jwt::JwtService,
    repositories::{ScrapeRepository, ScrapeRepositoryTrait},
    scrapes::ScrapePipeline,
};
use axum::extract::FromRef;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub scrape_repo: Arc<dyn ScrapeRepositoryTrait + Send + Sync>,
    pub pipeline: Arc<ScrapePipeline>,
    pub jwt: Arc<JwtService>,
    pub db_pool: Pool<Postgres>,
}

impl AppState {
    pub fn new(pool: Pool<Postgres>, pipeline: ScrapePipeline, jwt_secret: &str) -> Self {
        Self {
            scrape_repo: Arc::new(ScrapeRepository::new(pool.clone())),
            pipeline: Arc::new(pipeline),
            jwt: Arc::new(JwtService::new(jwt_secret)),
            db_pool: pool,
        }
    }
}

impl FromRef<AppState> for Arc<JwtService> {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
