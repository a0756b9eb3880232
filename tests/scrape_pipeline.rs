mod helpers;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex},
};

use helpers::{test_app, test_config};

const ARTICLE: &str = "# Rust 2026 roadmap\n\n\
The Rust project published its roadmap for the coming year with a focus on async ergonomics.\n\n\
Compiler performance work continues, with incremental builds getting noticeably faster in nightly.\n\n\
The survey also showed growing adoption of Rust in embedded systems and networking services.";

async fn mount_firecrawl(server: &MockServer, markdown: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": markdown,
                "metadata": {
                    "title": "Rust 2026 roadmap",
                    "description": "What is next for Rust",
                    "sourceURL": "https://blog.example.com/roadmap"
                },
                "links": ["https://blog.example.com/survey"]
            }
        })))
        .mount(server)
        .await;
}

async fn post_scrape(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/scrape")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_scrape_with_model_analysis() {
    let firecrawl = MockServer::start().await;
    let gemini = MockServer::start().await;
    mount_firecrawl(&firecrawl, ARTICLE).await;

    let reply = "**SOURCE SUMMARY:** The Rust roadmap focuses on async ergonomics and compiler speed.\n\n\
**SHORT SUMMARY:** Rust plans async and compiler improvements.\n\n\
**KEY HIGHLIGHTS:**\n\
1. Async ergonomics are the headline goal.\n\
2. Incremental builds are getting faster.\n\
3. Embedded adoption keeps growing.\n\n\
**VERIFIED ORIGIN:** Published by the Rust project blog.\n\n\
**FUTURE FORECAST:** Expect stabilizations through the year.\n\n\
**RELEVANCE SCORE:** Score: 8/10\n\n\
**LINKEDIN POST:** Rust has a new roadmap.\n\n\
**TWITTER POST:** Rust roadmap is out.";

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": reply }] } }]
        })))
        .expect(1)
        .mount(&gemini)
        .await;

    let config = test_config(Some(firecrawl.uri()), Some(gemini.uri()));
    let (status, body) = post_scrape(
        test_app(&config),
        json!({ "url": "https://blog.example.com/roadmap", "keywords": ["async"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["title"], "Rust 2026 roadmap");
    assert_eq!(data["meta_description"], "What is next for Rust");
    assert_eq!(data["analysis_source"], "model");
    assert_eq!(data["relevance_score"], 8.0);
    assert_eq!(
        data["ai_summary"],
        "The Rust roadmap focuses on async ergonomics and compiler speed."
    );
    assert_eq!(data["key_highlights"].as_array().unwrap().len(), 3);
    assert_eq!(data["highlighted_content"][0]["importance"], "high");
    assert_eq!(data["highlighted_content"][2]["importance"], "medium");
    assert_eq!(data["social_posts"]["twitter"], "Rust roadmap is out.");
    assert_eq!(data["links"][0]["url"], "https://blog.example.com/survey");
    assert!(data.get("id").is_none());
}

#[tokio::test]
async fn test_scrape_falls_back_when_model_fails() {
    let firecrawl = MockServer::start().await;
    let gemini = MockServer::start().await;
    mount_firecrawl(&firecrawl, ARTICLE).await;

    Mock::given(method("POST"))
        .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&gemini)
        .await;

    let config = test_config(Some(firecrawl.uri()), Some(gemini.uri()));
    let (status, body) = post_scrape(
        test_app(&config),
        json!({ "url": "https://blog.example.com/roadmap" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["analysis_source"], "deterministic");
    assert!(data["relevance_score"].is_null());
    assert!(
        data["ai_summary"]
            .as_str()
            .unwrap()
            .contains("async ergonomics")
    );
}

#[tokio::test]
async fn test_scrape_without_model_key_skips_gemini() {
    let firecrawl = MockServer::start().await;
    mount_firecrawl(&firecrawl, ARTICLE).await;

    let config = test_config(Some(firecrawl.uri()), None);
    let (status, body) = post_scrape(
        test_app(&config),
        json!({ "url": "https://blog.example.com/roadmap", "keywords": ["compiler"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["analysis_source"], "deterministic");
    assert!(body["data"]["relevance_score"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn test_scrape_reports_no_match() {
    let firecrawl = MockServer::start().await;
    let gemini = MockServer::start().await;
    mount_firecrawl(&firecrawl, ARTICLE).await;

    let config = test_config(Some(firecrawl.uri()), Some(gemini.uri()));
    let (status, body) = post_scrape(
        test_app(&config),
        json!({ "url": "https://blog.example.com/roadmap", "keywords": ["kubernetes"] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body.get("data").is_none());
    assert_eq!(body["noMatch"]["keywords"], json!(["kubernetes"]));
    assert!(gemini.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_scrape_upstream_failure_is_bad_gateway() {
    let firecrawl = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&firecrawl)
        .await;

    let config = test_config(Some(firecrawl.uri()), None);
    let (status, body) = post_scrape(
        test_app(&config),
        json!({ "url": "https://blog.example.com/roadmap" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_scrape_without_firecrawl_key_is_unavailable() {
    let config = test_config(None, None);
    let (status, body) = post_scrape(
        test_app(&config),
        json!({ "url": "https://blog.example.com/roadmap" }),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}
