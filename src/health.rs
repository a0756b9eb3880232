use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::{app_state::AppState, scrapes::ScrapePipeline};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    database: String,
    /// `configured` or `missing`.
    content_extraction: String,
    /// `model` when a model is configured, else `deterministic`.
    analysis: String,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Health check successful", body = HealthResponse),
        (status = 503, description = "Database unavailable")
    )
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    match check_database_health(&state.db_pool).await {
        Ok(_) => {
            debug!("Health check passed");
            Ok(Json(healthy(&state.pipeline)))
        }
        Err(e) => {
            error!(error = %e, "Database health check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

fn healthy(pipeline: &ScrapePipeline) -> HealthResponse {
    HealthResponse {
        status: "OK".to_string(),
        database: "healthy".to_string(),
        content_extraction: if pipeline.can_fetch() {
            "configured"
        } else {
            "missing"
        }
        .to_string(),
        analysis: if pipeline.has_model() {
            "model"
        } else {
            "deterministic"
        }
        .to_string(),
    }
}

async fn check_database_health(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisEngine;

    #[test]
    fn test_reports_unconfigured_upstreams() {
        let pipeline = ScrapePipeline::new(None, AnalysisEngine::deterministic());
        let response = healthy(&pipeline);
        assert_eq!(response.content_extraction, "missing");
        assert_eq!(response.analysis, "deterministic");
    }
}
