use axum::{
    Router,
    http::Request,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app_state::AppState,
    auth::dtos::ErrorResponse,
    entities::{
        AnalysisSource, HighlightedExcerpt, Importance, ImportanceLevel, Link, OgData,
        ScrapeResult, SocialPosts,
    },
    health,
    scrapes::{
        dtos::{NoMatchResponse, ScrapeListResponse, ScrapeRequest, ScrapeResponse},
        handlers,
    },
};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";
pub const DOCS_PATH: &str = "/docs";

#[derive(OpenApi)]
#[openapi(
    info(title = "ScrapeMaster API", description = "Scrape, analyze and save web pages"),
    paths(
        health::health_check,
        handlers::scrape_url,
        handlers::save_scrape,
        handlers::list_scrapes,
        handlers::get_scrape,
        handlers::delete_scrape,
    ),
    components(schemas(
        ScrapeRequest,
        ScrapeResponse,
        NoMatchResponse,
        ScrapeListResponse,
        ScrapeResult,
        Link,
        HighlightedExcerpt,
        Importance,
        ImportanceLevel,
        OgData,
        SocialPosts,
        AnalysisSource,
        ErrorResponse,
        health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "scrape", description = "Scrape and analyze a page"),
        (name = "scrapes", description = "Saved scrapes of the signed-in user"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// The full application router: API routes, docs and the HTTP layers.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/healthz", get(health::health_check))
        .route("/v1/scrape", post(handlers::scrape_url))
        .route(
            "/v1/scrapes",
            post(handlers::save_scrape).get(handlers::list_scrapes),
        )
        .route(
            "/v1/scrapes/{id}",
            get(handlers::get_scrape).delete(handlers::delete_scrape),
        )
        .with_state(state);

    api.merge(SwaggerUi::new(DOCS_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id,
                        )
                    }),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        analysis::AnalysisEngine, auth::jwt::JwtService,
        repositories::scrape::MockScrapeRepositoryTrait, scrapes::ScrapePipeline,
    };
    use axum::{
        body::{Body, to_bytes},
        http::StatusCode,
    };
    use serde_json::Value;
    use sqlx::{Pool, Postgres};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState {
            scrape_repo: Arc::new(MockScrapeRepositoryTrait::new()),
            pipeline: Arc::new(ScrapePipeline::new(None, AnalysisEngine::deterministic())),
            jwt: Arc::new(JwtService::new("test-secret")),
            db_pool: Pool::<Postgres>::connect_lazy("postgresql://dummy")
                .expect("Failed to create test pool"),
        };
        build_router(state)
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let request = Request::builder()
            .uri(OPENAPI_PATH)
            .body(Body::empty())
            .unwrap();

        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let doc: Value = serde_json::from_slice(&body).unwrap();
        for path in ["/v1/scrape", "/v1/scrapes", "/v1/scrapes/{id}", "/healthz"] {
            assert!(doc["paths"].get(path).is_some(), "missing {}", path);
        }
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
    }

    #[tokio::test]
    async fn test_request_id_is_generated_and_propagated() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/scrapes")
            .body(Body::empty())
            .unwrap();

        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_request_id_from_caller_is_kept() {
        let request = Request::builder()
            .uri("/v1/scrapes")
            .header("x-request-id", "abc-123")
            .body(Body::empty())
            .unwrap();

        let response = create_test_app().oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }
}
