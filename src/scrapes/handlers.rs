use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    app_state::AppState,
    auth::{dtos::ErrorResponse, middleware::AuthenticatedUser},
    entities::ScrapeResult,
    scrapes::{
        dtos::{SaveScrapeRequest, ScrapeListResponse, ScrapeRequest, ScrapeResponse},
        pipeline::{PipelineError, ScrapeOutcome},
    },
};

#[utoipa::path(
    post,
    path = "/v1/scrape",
    tag = "scrape",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Scrape result, or a no-match notice", body = ScrapeResponse),
        (status = 400, description = "Invalid request", body = ScrapeResponse),
        (status = 502, description = "Content extraction failed", body = ScrapeResponse),
        (status = 503, description = "Content extraction is not configured", body = ScrapeResponse)
    )
)]
pub async fn scrape_url(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ScrapeResponse::error(rejection.body_text())),
            )
                .into_response();
        }
    };

    match state.pipeline.run(&payload).await {
        Ok(ScrapeOutcome::Completed(result)) => {
            (StatusCode::OK, Json(ScrapeResponse::data(*result))).into_response()
        }
        Ok(ScrapeOutcome::NoMatch(no_match)) => {
            (StatusCode::OK, Json(ScrapeResponse::no_match(no_match))).into_response()
        }
        Err(PipelineError::Validation(error)) => {
            (StatusCode::BAD_REQUEST, Json(ScrapeResponse::error(error))).into_response()
        }
        Err(PipelineError::NotConfigured(e)) => {
            error!(error = %e, "Scrape requested but content extraction is not configured");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ScrapeResponse::error("Content extraction is not configured")),
            )
                .into_response()
        }
        Err(PipelineError::Fetch(e)) => {
            warn!(error = %e, url = %payload.url, "Content extraction failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ScrapeResponse::error(format!("Failed to scrape page: {}", e))),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/scrapes",
    tag = "scrapes",
    request_body = ScrapeResult,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Saved scrape", body = ScrapeResult),
        (status = 400, description = "Invalid scrape", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn save_scrape(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    payload: Result<Json<SaveScrapeRequest>, JsonRejection>,
) -> Response {
    let result = match payload
        .map_err(|rejection| rejection.body_text())
        .and_then(|Json(payload)| payload.validate())
    {
        Ok(result) => result,
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response();
        }
    };

    match state.scrape_repo.insert(auth_user.user_id, &result).await {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to save scrape");
            database_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/scrapes",
    tag = "scrapes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "The caller's scrapes, newest first", body = ScrapeListResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn list_scrapes(auth_user: AuthenticatedUser, State(state): State<AppState>) -> Response {
    match state.scrape_repo.list_for_user(auth_user.user_id).await {
        Ok(scrapes) => (StatusCode::OK, Json(ScrapeListResponse { scrapes })).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list scrapes");
            database_error()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v1/scrapes/{id}",
    tag = "scrapes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Scrape id")),
    responses(
        (status = 200, description = "The scrape", body = ScrapeResult),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn get_scrape(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.scrape_repo.find_for_user(auth_user.user_id, id).await {
        Ok(Some(scrape)) => (StatusCode::OK, Json(scrape)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Scrape not found")),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to load scrape");
            database_error()
        }
    }
}

#[utoipa::path(
    delete,
    path = "/v1/scrapes/{id}",
    tag = "scrapes",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Scrape id")),
    responses(
        (status = 204, description = "Deleted, or nothing to delete"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    )
)]
pub async fn delete_scrape(
    auth_user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.scrape_repo.delete_for_user(auth_user.user_id, id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete scrape");
            database_error()
        }
    }
}

fn database_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Database error")),
    )
        .into_response()
}
