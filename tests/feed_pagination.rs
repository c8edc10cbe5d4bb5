//! End-to-end paging: feed session → proxy → mocked headline API.

use chrono::{DateTime, Utc};
use newshub::feed::{
    ApplyOutcome, ClientSettings, FeedSession, HeadlineClient, SortOrder, PLAN_LIMIT_MESSAGE,
};
use newshub::proxy::{self, ProxyState, UpstreamClient, UpstreamConfig};
use newshub::storage::LocalStore;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_proxy(upstream: &MockServer) -> String {
    let client = UpstreamClient::new(UpstreamConfig {
        base_url: upstream.uri(),
        api_key: Some(SecretString::from("test-key")),
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
    format!("http://{addr}/api")
}

fn session(backend_url: String, store: LocalStore) -> FeedSession {
    let client = HeadlineClient::new(ClientSettings {
        backend_url,
        ..Default::default()
    })
    .unwrap();
    FeedSession::restore(Arc::new(client), store, Some("technology"))
}

/// Articles published on 2024-10-16 at the given hours, in the given order.
fn payload(prefix: &str, hours: &[u32]) -> Value {
    let articles: Vec<Value> = hours
        .iter()
        .map(|h| {
            json!({
                "title": format!("{prefix} {h}"),
                "description": "Summary",
                "url": format!("https://news.example.com/{prefix}/{h}"),
                "publishedAt": format!("2024-10-16T{:02}:00:00Z", h),
                "source": { "name": format!("Source {}", h % 2) }
            })
        })
        .collect();
    json!({ "totalArticles": 50, "articles": articles })
}

async fn mount_page(server: &MockServer, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/top-headlines"))
        .and(query_param("category", "technology"))
        .and(query_param("page", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn is_descending(times: &[DateTime<Utc>]) -> bool {
    times.windows(2).all(|w| w[0] >= w[1])
}

#[tokio::test]
async fn test_first_page_sorted_with_more_available() {
    let upstream = MockServer::start().await;
    mount_page(&upstream, "1", payload("p1", &[3, 9, 1, 12, 7, 5])).await;
    let store = LocalStore::in_memory();
    let mut session = session(spawn_proxy(&upstream).await, store.clone());

    let request = session.start();
    assert_eq!(session.run(request).await, ApplyOutcome::Applied);

    let controller = session.controller();
    assert_eq!(controller.articles().len(), 6);
    let times: Vec<_> = controller.articles().iter().map(|a| a.published_at).collect();
    assert!(is_descending(&times));
    assert_eq!(controller.articles()[0].title, "p1 12");
    assert!(controller.has_more());
    assert!(controller.error().is_none());

    let requests = upstream.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.query(),
        Some("category=technology&lang=en&country=in&max=6&page=1&apikey=test-key")
    );

    // Snapshot written for the detail view
    assert_eq!(store.current_articles().len(), 6);
}

#[tokio::test]
async fn test_load_more_merges_and_resorts() {
    let upstream = MockServer::start().await;
    mount_page(&upstream, "1", payload("p1", &[10, 8, 6])).await;
    mount_page(&upstream, "2", payload("p2", &[11, 7, 2])).await;
    mount_page(&upstream, "3", payload("p3", &[])).await;
    let mut session = session(spawn_proxy(&upstream).await, LocalStore::in_memory());

    let request = session.start();
    session.run(request).await;
    let request = session.load_more();
    assert_eq!(request.page, 2);
    session.run(request).await;

    let titles: Vec<_> = session
        .controller()
        .articles()
        .iter()
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(
        titles,
        vec!["p2 11", "p1 10", "p1 8", "p2 7", "p1 6", "p2 2"]
    );
    assert!(session.controller().has_more());

    let request = session.load_more();
    session.run(request).await;
    assert_eq!(session.controller().articles().len(), 6);
    assert!(!session.controller().has_more());
    assert!(!session.controller().can_load_more());
}

#[tokio::test]
async fn test_plan_limit_keeps_accumulated_articles() {
    let upstream = MockServer::start().await;
    mount_page(&upstream, "1", payload("p1", &[4, 5])).await;
    Mock::given(method("GET"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(426))
        .mount(&upstream)
        .await;
    let mut session = session(spawn_proxy(&upstream).await, LocalStore::in_memory());

    let request = session.start();
    session.run(request).await;
    let request = session.load_more();
    assert_eq!(session.run(request).await, ApplyOutcome::Applied);

    let controller = session.controller();
    assert_eq!(controller.error(), Some(PLAN_LIMIT_MESSAGE));
    assert_eq!(controller.articles().len(), 2);
    assert!(!controller.has_more());
}

#[tokio::test]
async fn test_superseded_request_is_discarded() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("category", "technology"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(payload("slow", &[1]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(query_param("category", "sports"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload("fast", &[2, 3])))
        .mount(&upstream)
        .await;
    let mut session = session(spawn_proxy(&upstream).await, LocalStore::in_memory());

    let slow_request = session.start();
    let slow = session.fetch(slow_request);
    let fast_request = session.change_category("sports");
    let fast = session.fetch(fast_request);

    let (slow_result, fast_result) = tokio::join!(slow, fast);
    assert_eq!(session.apply(&fast_result.0, fast_result.1), ApplyOutcome::Applied);
    assert_eq!(session.apply(&slow_result.0, slow_result.1), ApplyOutcome::Stale);

    let titles: Vec<_> = session
        .controller()
        .articles()
        .iter()
        .map(|a| a.title.as_str())
        .collect();
    assert_eq!(titles, vec!["fast 3", "fast 2"]);
}

#[tokio::test]
async fn test_query_changes_persist_and_restore() {
    let upstream = MockServer::start().await;
    let store = LocalStore::in_memory();
    let backend_url = spawn_proxy(&upstream).await;

    let mut first = session(backend_url.clone(), store.clone());
    first.change_category("technology");
    first.change_sort(SortOrder::Relevancy);
    first.change_search("chips");

    let client = HeadlineClient::new(ClientSettings {
        backend_url,
        ..Default::default()
    })
    .unwrap();
    let restored = FeedSession::restore(Arc::new(client), store, None);
    let query = restored.controller().query();
    assert_eq!(query.category, "technology");
    assert_eq!(query.sort_order, SortOrder::Relevancy);
    assert_eq!(query.search_term, "chips");
}
