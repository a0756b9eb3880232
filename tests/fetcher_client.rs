use scrapemaster::{
    config::Config,
    fetcher::{FetchError, FirecrawlClient, PageBody, PageFetcher},
};
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

fn client_for(server: &MockServer) -> FirecrawlClient {
    let config = Config::default().with_firecrawl(Some("fc-test-key"), server.uri());
    FirecrawlClient::new(&config).expect("Failed to build client")
}

fn page_url() -> Url {
    Url::parse("https://news.example.com/story").unwrap()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer fc-test-key"))
        .and(body_partial_json(json!({
            "url": "https://news.example.com/story",
            "formats": ["markdown", "html"],
            "onlyMainContent": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "# Story\n\nRead the [full report](https://news.example.com/report).",
                "html": "<h1>Story</h1><a href=\"/report\">full report</a>",
                "metadata": {
                    "title": "Story",
                    "description": "A story",
                    "ogImage": "https://news.example.com/og.png",
                    "sourceURL": "https://news.example.com/story"
                },
                "links": ["https://news.example.com/report", "https://other.example.org/"]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let page = client_for(&mock_server)
        .fetch(&page_url(), &["story".to_string()])
        .await
        .unwrap();

    assert_eq!(page.url, page_url());
    assert_eq!(page.title(), Some("Story"));
    assert!(matches!(page.body(), PageBody::Markdown(md) if md.starts_with("# Story")));
    assert_eq!(page.metadata.description.as_deref(), Some("A story"));
    assert!(page.metadata.og_data().is_some());

    assert_eq!(page.links.len(), 2);
    assert_eq!(page.links[0].text, "full report");
    assert_eq!(page.links[0].kind.as_deref(), Some("internal"));
    assert_eq!(page.links[1].kind.as_deref(), Some("external"));
}

#[tokio::test]
async fn test_keywords_do_not_change_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "Body", "metadata": {} }
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.fetch(&page_url(), &[]).await.unwrap();
    client
        .fetch(&page_url(), &["alpha".to_string(), "beta".to_string()])
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_fetch_http_error_carries_upstream_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(402).set_body_json(json!({
            "success": false,
            "error": "Insufficient credits"
        })))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).fetch(&page_url(), &[]).await;

    match result {
        Err(FetchError::Http { status, message }) => {
            assert_eq!(status.as_u16(), 402);
            assert_eq!(message, "Insufficient credits");
        }
        other => panic!("Expected HTTP 402 error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_server_error_without_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).fetch(&page_url(), &[]).await;

    match result {
        Err(err @ FetchError::Http { .. }) => {
            assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
        }
        other => panic!("Expected HTTP 500 error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_unsuccessful_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Failed to load page"
        })))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).fetch(&page_url(), &[]).await;
    assert!(matches!(result, Err(FetchError::Unsuccessful(msg)) if msg == "Failed to load page"));
}

#[tokio::test]
async fn test_fetch_invalid_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>not json</html>")
                .insert_header("Content-Type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).fetch(&page_url(), &[]).await;
    assert!(matches!(result, Err(FetchError::Decode(_))));
}

#[tokio::test]
async fn test_links_discovered_in_markdown_when_upstream_sends_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "markdown": "See https://docs.example.org/guide and mailto:me@example.com for more.",
                "metadata": {}
            }
        })))
        .mount(&mock_server)
        .await;

    let page = client_for(&mock_server).fetch(&page_url(), &[]).await.unwrap();

    assert_eq!(page.links.len(), 1);
    assert_eq!(page.links[0].url, "https://docs.example.org/guide");
    assert_eq!(page.links[0].kind.as_deref(), Some("external"));
}

#[tokio::test]
async fn test_connection_refused() {
    let config = Config::default().with_firecrawl(Some("key"), "http://127.0.0.1:1");
    let client = FirecrawlClient::new(&config).unwrap();

    let result = client.fetch(&page_url(), &[]).await;
    assert!(matches!(
        result,
        Err(FetchError::Connect(_)) | Err(FetchError::ConnectTimeout)
    ));
}
