use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use super::query::{FeedQuery, SortOrder};
use crate::news::{parse_headlines, HeadlinesPage};
use crate::util::{read_limited_bytes, BodyReadError};

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Message shown when the upstream plan quota is exhausted.
pub const PLAN_LIMIT_MESSAGE: &str = "API Plan Limit Reached: Upgrade Required";

/// Errors from fetching one page of headlines through the proxy.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The proxy answered 426: upstream quota exhausted.
    #[error("{}", PLAN_LIMIT_MESSAGE)]
    PlanLimit,
    /// Any other non-2xx answer.
    #[error("Failed to fetch news: {status} {reason}")]
    Http { status: u16, reason: String },
    /// DNS, connect, TLS, or mid-body transport failure.
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("Request timed out")]
    Timeout,
    /// Body was not the expected JSON shape.
    #[error("Invalid response: {0}")]
    Parse(String),
    #[error("Response too large")]
    ResponseTooLarge,
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// Text shown in the feed's error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::PlanLimit => PLAN_LIMIT_MESSAGE.to_string(),
            other => format!("Error fetching news: {other}"),
        }
    }
}

/// Connection settings for [`HeadlineClient`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Proxy API root, e.g. `http://127.0.0.1:5000/api`.
    pub backend_url: String,
    pub language: String,
    pub country: String,
    pub page_size: u32,
    pub timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000/api".to_string(),
            language: "en".to_string(),
            country: "in".to_string(),
            page_size: 6,
            timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP client for the headline proxy.
#[derive(Debug, Clone)]
pub struct HeadlineClient {
    http: reqwest::Client,
    endpoint: Url,
    settings: ClientSettings,
}

impl HeadlineClient {
    pub fn new(settings: ClientSettings) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;
        Self::with_client(http, settings)
    }

    /// Use an existing `reqwest::Client` (shared pool, custom TLS, tests).
    pub fn with_client(http: reqwest::Client, settings: ClientSettings) -> Result<Self, FetchError> {
        let endpoint = Url::parse(&format!(
            "{}/news/top-headlines",
            settings.backend_url.trim_end_matches('/')
        ))?;
        Ok(Self {
            http,
            endpoint,
            settings,
        })
    }

    /// Full request URL for `page` of `query`.
    ///
    /// `sortBy` is only sent for relevancy; publication order is the
    /// upstream default.
    pub fn page_url(&self, query: &FeedQuery, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("category", &query.category)
                .append_pair("lang", &self.settings.language)
                .append_pair("country", &self.settings.country)
                .append_pair("max", &self.settings.page_size.to_string())
                .append_pair("page", &page.to_string());
            if let Some(term) = query.search() {
                pairs.append_pair("q", term);
            }
            if query.sort_order == SortOrder::Relevancy {
                pairs.append_pair("sortBy", SortOrder::Relevancy.as_str());
            }
        }
        url
    }

    /// Fetch and normalize one page. Never retries.
    pub async fn fetch_page(&self, query: &FeedQuery, page: u32) -> Result<HeadlinesPage, FetchError> {
        let url = self.page_url(query, page);
        tracing::debug!(url = %url, "Fetching headlines page");

        tokio::time::timeout(self.settings.timeout, self.fetch_url(url))
            .await
            .map_err(|_| FetchError::Timeout)?
    }

    async fn fetch_url(&self, url: Url) -> Result<HeadlinesPage, FetchError> {
        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UPGRADE_REQUIRED {
            return Err(FetchError::PlanLimit);
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        parse_headlines(&bytes).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

impl From<BodyReadError> for FetchError {
    fn from(err: BodyReadError) -> Self {
        match err {
            BodyReadError::TooLarge => Self::ResponseTooLarge,
            BodyReadError::Network(e) => Self::Network(e),
        }
    }
}
