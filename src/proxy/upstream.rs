use std::time::Duration;

use axum::http::StatusCode;
use reqwest::header::{ACCEPT, USER_AGENT};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use super::error::{ProxyError, SetupError};
use crate::util::{read_limited_bytes, validate_base_url, BodyReadError, UrlValidationError};

const MAX_UPSTREAM_SIZE: usize = 5 * 1024 * 1024; // 5MB
const PROXY_USER_AGENT: &str = "NewsHub-Backend/1.0";

/// Upstream connection settings.
pub struct UpstreamConfig {
    /// API root, e.g. `https://gnews.io/api/v4`.
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout: Duration,
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Query parameters accepted by the headline endpoint. Values are kept as
/// strings and forwarded without coercion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlineParams {
    pub category: Option<String>,
    pub lang: Option<String>,
    pub country: Option<String>,
    pub max: Option<String>,
    pub page: Option<String>,
    pub q: Option<String>,
    pub sort_by: Option<String>,
}

/// Calls the upstream `top-headlines` endpoint with the server-held key.
#[derive(Debug)]
pub struct UpstreamClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<SecretString>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, SetupError> {
        let base = validate_base_url(config.base_url.trim_end_matches('/'))?;
        let endpoint = Url::parse(&format!("{}/top-headlines", base.as_str().trim_end_matches('/')))
            .map_err(UrlValidationError::from)?;

        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key.filter(|k| !k.expose_secret().trim().is_empty()),
            timeout: config.timeout,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Upstream URL for `params`, including the credential.
    ///
    /// `lang`, `country`, `max`, and `page` default to `en`, `in`, `6`, `1`
    /// when absent. Empty `q` and `sortBy` are omitted.
    fn request_url(&self, category: &str, params: &HeadlineParams, api_key: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("category", category)
                .append_pair("lang", params.lang.as_deref().unwrap_or("en"))
                .append_pair("country", params.country.as_deref().unwrap_or("in"))
                .append_pair("max", params.max.as_deref().unwrap_or("6"))
                .append_pair("page", params.page.as_deref().unwrap_or("1"))
                .append_pair("apikey", api_key);
            if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
                pairs.append_pair("q", q);
            }
            if let Some(sort_by) = params.sort_by.as_deref().filter(|s| !s.is_empty()) {
                pairs.append_pair("sortBy", sort_by);
            }
        }
        url
    }

    /// Validate `params`, call upstream once, and return its JSON body bytes
    /// unchanged.
    pub async fn top_headlines(&self, params: &HeadlineParams) -> Result<Vec<u8>, ProxyError> {
        let category = params
            .category
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(ProxyError::MissingCategory)?;
        let api_key = self.api_key.as_ref().ok_or(ProxyError::MissingApiKey)?;

        let url = self.request_url(category, params, api_key.expose_secret());
        tracing::debug!(category, page = params.page.as_deref().unwrap_or("1"), "Forwarding headline request");

        tokio::time::timeout(self.timeout, self.forward(url))
            .await
            .map_err(|_| ProxyError::Server("upstream request timed out".to_string()))?
    }

    async fn forward(&self, url: Url) -> Result<Vec<u8>, ProxyError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, PROXY_USER_AGENT)
            .send()
            .await
            // Strip the URL: it carries the credential
            .map_err(|e| ProxyError::Server(e.without_url().to_string()))?;

        let status = response.status();
        if status.as_u16() == StatusCode::UPGRADE_REQUIRED.as_u16() {
            tracing::warn!("Upstream plan limit reached");
            return Err(ProxyError::PlanLimit);
        }
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Upstream returned error status");
            return Err(ProxyError::Upstream {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = read_limited_bytes(response, MAX_UPSTREAM_SIZE)
            .await
            .map_err(|e| match e {
                BodyReadError::TooLarge => ProxyError::Server("upstream response too large".to_string()),
                BodyReadError::Network(e) => ProxyError::Server(e.without_url().to_string()),
            })?;
        serde_json::from_slice::<serde::de::IgnoredAny>(&body)
            .map_err(|e| ProxyError::Server(format!("invalid upstream JSON: {e}")))?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str, api_key: Option<&str>) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig {
            base_url: base_url.to_string(),
            api_key: api_key.map(SecretString::from),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn params(category: Option<&str>) -> HeadlineParams {
        HeadlineParams {
            category: category.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_insecure_base_url() {
        let result = UpstreamClient::new(UpstreamConfig {
            base_url: "http://gnews.io/api/v4".into(),
            api_key: None,
            timeout: Duration::from_secs(5),
        });
        assert!(matches!(result, Err(SetupError::BaseUrl(_))));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(!client("https://gnews.io/api/v4", Some("  ")).has_api_key());
        assert!(client("https://gnews.io/api/v4", Some("k")).has_api_key());
    }

    #[test]
    fn test_request_url_defaults() {
        let c = client("https://gnews.io/api/v4/", Some("k"));
        let url = c.request_url("technology", &params(Some("technology")), "k");
        assert_eq!(
            url.as_str(),
            "https://gnews.io/api/v4/top-headlines?category=technology&lang=en&country=in&max=6&page=1&apikey=k"
        );
    }

    #[test]
    fn test_request_url_forwards_values_verbatim() {
        let c = client("https://gnews.io/api/v4", Some("k"));
        let p = HeadlineParams {
            category: Some("world".into()),
            lang: Some("fr".into()),
            country: Some("ca".into()),
            max: Some("abc".into()),
            page: Some("7".into()),
            q: Some("a&b".into()),
            sort_by: Some("relevance".into()),
        };
        let url = c.request_url("world", &p, "k");
        assert_eq!(
            url.query(),
            Some("category=world&lang=fr&country=ca&max=abc&page=7&apikey=k&q=a%26b&sortBy=relevance")
        );
    }

    #[tokio::test]
    async fn test_missing_category_checked_first() {
        let c = client("https://gnews.io/api/v4", None);
        assert!(matches!(
            c.top_headlines(&params(None)).await,
            Err(ProxyError::MissingCategory)
        ));
        assert!(matches!(
            c.top_headlines(&params(Some(""))).await,
            Err(ProxyError::MissingCategory)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let c = client(&server.uri(), None);
        assert!(matches!(
            c.top_headlines(&params(Some("sports"))).await,
            Err(ProxyError::MissingApiKey)
        ));
    }

    #[tokio::test]
    async fn test_success_body_passed_through() {
        let server = MockServer::start().await;
        let body = r#"{"totalArticles":1,"articles":[{"title":"T","url":"https://e.com/t","extra":true}]}"#;
        Mock::given(method("GET"))
            .and(path("/top-headlines"))
            .and(query_param("category", "health"))
            .and(query_param("apikey", "secret"))
            .and(query_param_is_missing("q"))
            .and(header("user-agent", "NewsHub-Backend/1.0"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(1)
            .mount(&server)
            .await;

        let c = client(&server.uri(), Some("secret"));
        let bytes = c.top_headlines(&params(Some("health"))).await.unwrap();
        assert_eq!(bytes, body.as_bytes());
    }

    #[tokio::test]
    async fn test_upstream_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("category", "limited"))
            .respond_with(ResponseTemplate::new(426))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("category", "forbidden"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("category", "garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let c = client(&server.uri(), Some("k"));
        assert!(matches!(
            c.top_headlines(&params(Some("limited"))).await,
            Err(ProxyError::PlanLimit)
        ));
        match c.top_headlines(&params(Some("forbidden"))).await {
            Err(ProxyError::Upstream { status, reason }) => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(reason, "Forbidden");
            }
            other => panic!("Expected Upstream error, got {:?}", other),
        }
        assert!(matches!(
            c.top_headlines(&params(Some("garbage"))).await,
            Err(ProxyError::Server(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_server_error() {
        // Port 9 (discard) on loopback is almost never listening
        let c = client("http://127.0.0.1:9", Some("k"));
        match c.top_headlines(&params(Some("general"))).await {
            Err(ProxyError::Server(msg)) => assert!(!msg.contains("apikey")),
            other => panic!("Expected Server error, got {:?}", other),
        }
    }
}
