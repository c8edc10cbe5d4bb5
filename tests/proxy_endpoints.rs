//! Integration tests for the headline proxy.
//!
//! Each test runs the real axum router on an ephemeral port in front of a
//! wiremock server standing in for the headline API.

use newshub::proxy::{self, ProxyState, UpstreamClient, UpstreamConfig};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

/// Start a proxy forwarding to `upstream` and return its base URL.
async fn spawn_proxy(upstream: &MockServer, api_key: Option<&str>) -> String {
    let client = UpstreamClient::new(UpstreamConfig {
        base_url: upstream.uri(),
        api_key: api_key.map(SecretString::from),
        timeout: Duration::from_secs(5),
    })
    .unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(proxy::serve(
        listener,
        ProxyState::new(client),
        std::future::pending(),
    ));
    format!("http://{addr}")
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    let body = response.text().await.unwrap();
    (status, serde_json::from_str(&body).unwrap())
}

fn articles_payload(count: usize) -> Value {
    let articles: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "title": format!("Story {i}"),
                "description": "Details",
                "content": "Body",
                "url": format!("https://news.example.com/{i}"),
                "image": null,
                "publishedAt": format!("2024-10-16T{:02}:00:00Z", i),
                "source": { "name": "Example", "url": "https://news.example.com" }
            })
        })
        .collect();
    json!({ "totalArticles": 100, "articles": articles })
}

#[tokio::test]
async fn test_health() {
    let upstream = MockServer::start().await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let (status, body) = get_json(&format!("{base}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({ "status": "ok", "message": "NewsHub backend is running" })
    );
}

#[tokio::test]
async fn test_missing_category_is_400_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    for query in ["", "?lang=en&page=2", "?category="] {
        let (status, body) = get_json(&format!("{base}/api/news/top-headlines{query}")).await;
        assert_eq!(status, 400);
        assert_eq!(body, json!({ "error": "Missing required parameter: category" }));
    }
}

#[tokio::test]
async fn test_malformed_query_is_json_400_without_upstream_call() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let response = reqwest::get(format!(
        "{base}/api/news/top-headlines?category=a&category=b"
    ))
    .await
    .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok()),
        Some("application/json")
    );
    let body: Value = serde_json::from_str(&response.text().await.unwrap()).unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("category"), "unexpected message: {message}");
}

#[tokio::test]
async fn test_missing_api_key_is_500() {
    let upstream = MockServer::start().await;
    let base = spawn_proxy(&upstream, None).await;

    let (status, body) =
        get_json(&format!("{base}/api/news/top-headlines?category=general")).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({ "error": "API key not configured" }));
}

#[tokio::test]
async fn test_plan_limit_is_426() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .respond_with(ResponseTemplate::new(426))
        .mount(&upstream)
        .await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let (status, body) =
        get_json(&format!("{base}/api/news/top-headlines?category=business")).await;
    assert_eq!(status, 426);
    assert_eq!(
        body,
        json!({ "error": "API Plan Limit Reached: Upgrade Required" })
    );
}

#[tokio::test]
async fn test_upstream_error_status_passed_through() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&upstream)
        .await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let (status, body) =
        get_json(&format!("{base}/api/news/top-headlines?category=health")).await;
    assert_eq!(status, 403);
    assert_eq!(body, json!({ "error": "Failed to fetch news: 403 Forbidden" }));
}

#[tokio::test]
async fn test_forwards_defaults_and_returns_body_unchanged() {
    let upstream = MockServer::start().await;
    let payload = articles_payload(6);
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("category", "technology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&payload))
        .expect(1)
        .mount(&upstream)
        .await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let (status, body) =
        get_json(&format!("{base}/api/news/top-headlines?category=technology")).await;
    assert_eq!(status, 200);
    assert_eq!(body, payload);

    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("category=technology&lang=en&country=in&max=6&page=1&apikey=test-key")
    );
}

#[tokio::test]
async fn test_forwards_search_and_sort() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "space x"))
        .and(query_param("sortBy", "relevancy"))
        .and(query_param("page", "3"))
        .and(query_param("lang", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(articles_payload(0)))
        .expect(1)
        .mount(&upstream)
        .await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let (status, _) = get_json(&format!(
        "{base}/api/news/top-headlines?category=science&lang=fr&page=3&q=space%20x&sortBy=relevancy"
    ))
    .await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let upstream = MockServer::start().await;
    let base = spawn_proxy(&upstream, Some(API_KEY)).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
