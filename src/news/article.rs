use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::util::{preview, reading_time_minutes, strip_control_chars};

/// Image shown when the upstream article carries none.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400";
/// Description shown when the upstream article carries none.
pub const FALLBACK_DESCRIPTION: &str = "No description available";
/// Title shown when the upstream article carries none.
pub const FALLBACK_TITLE: &str = "Untitled";

// ============================================================================
// Upstream (wire) shapes
// ============================================================================

/// Article exactly as the headline API sends it. Every field is optional
/// because nothing about the upstream shape is guaranteed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<RawSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSource {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// Top-level headline payload.
///
/// Entries stay as untyped JSON until normalization so one malformed entry
/// cannot reject the page. `"articles": null` reads as an empty page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawHeadlines {
    pub total_articles: Option<u64>,
    pub articles: Option<Vec<serde_json::Value>>,
}

// ============================================================================
// Normalized article
// ============================================================================

/// Publisher of an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A validated headline. Identity is the url: two articles with the same
/// url compare equal and hash the same regardless of their other fields.
///
/// Serialized with the upstream field names so persisted bookmarks keep the
/// shape the API produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Source,
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

impl Article {
    /// Validate and normalize one upstream entry.
    ///
    /// Returns `None` when the entry has no usable url, since an article
    /// without identity cannot be bookmarked, viewed, or de-duplicated.
    pub fn from_raw(raw: RawArticle) -> Option<Self> {
        let url = raw.url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())?;

        let published_at = raw
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH);

        let source = raw
            .source
            .map(|s| Source {
                name: non_blank(s.name).map(|n| strip_control_chars(&n).into_owned()),
                url: non_blank(s.url),
            })
            .unwrap_or_default();

        Some(Self {
            title: clean_or(raw.title, FALLBACK_TITLE),
            description: clean_or(raw.description, FALLBACK_DESCRIPTION),
            url,
            image: non_blank(raw.image).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            published_at,
            source,
        })
    }

    /// Publisher name, if the upstream supplied one.
    pub fn source_name(&self) -> Option<&str> {
        self.source.name.as_deref()
    }

    /// Estimated minutes to read, from the description word count.
    pub fn reading_time(&self) -> usize {
        reading_time_minutes(&self.description).max(1)
    }

    /// Description cut to `max_chars` for list previews.
    pub fn description_preview(&self, max_chars: usize) -> String {
        preview(&self.description, max_chars).into_owned()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn clean_or(value: Option<String>, fallback: &str) -> String {
    non_blank(value)
        .map(|v| strip_control_chars(v.trim()).into_owned())
        .unwrap_or_else(|| fallback.to_string())
}

// ============================================================================
// Page normalization
// ============================================================================

/// One page of normalized headlines.
#[derive(Debug, Clone, Default)]
pub struct HeadlinesPage {
    /// Upstream's count of matching articles across all pages, if reported.
    pub total_articles: Option<u64>,
    pub articles: Vec<Article>,
    /// Entries discarded during normalization (malformed or no url).
    pub dropped: usize,
}

/// Normalize a raw payload into a page, keeping upstream order.
pub fn normalize_headlines(raw: RawHeadlines) -> HeadlinesPage {
    let entries = raw.articles.unwrap_or_default();
    let received = entries.len();
    let mut malformed = 0usize;
    let articles: Vec<Article> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<RawArticle>(entry) {
            Ok(raw) => Article::from_raw(raw),
            Err(e) => {
                malformed += 1;
                tracing::debug!(error = %e, "Skipping malformed upstream article");
                None
            }
        })
        .collect();
    let dropped = received - articles.len();
    if dropped > 0 {
        tracing::warn!(dropped, malformed, received, "Dropped unusable upstream articles");
    }
    HeadlinesPage {
        total_articles: raw.total_articles,
        articles,
        dropped,
    }
}

/// Parse and normalize a JSON payload.
pub fn parse_headlines(bytes: &[u8]) -> Result<HeadlinesPage, serde_json::Error> {
    let raw: RawHeadlines = serde_json::from_slice(bytes)?;
    Ok(normalize_headlines(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(url: Option<&str>) -> RawArticle {
        RawArticle {
            title: Some("Title".into()),
            description: Some("Body text".into()),
            content: None,
            url: url.map(String::from),
            image: Some("https://img.example.com/a.jpg".into()),
            published_at: Some("2024-10-21T07:28:00Z".into()),
            source: Some(RawSource {
                name: Some("Example Times".into()),
                url: Some("https://example.com".into()),
            }),
        }
    }

    #[test]
    fn test_full_entry_is_kept_verbatim() {
        let article = Article::from_raw(raw(Some("https://example.com/a"))).unwrap();
        assert_eq!(article.title, "Title");
        assert_eq!(article.description, "Body text");
        assert_eq!(article.image, "https://img.example.com/a.jpg");
        assert_eq!(article.source_name(), Some("Example Times"));
        assert_eq!(article.published_at.to_rfc3339(), "2024-10-21T07:28:00+00:00");
    }

    #[test]
    fn test_missing_url_is_dropped() {
        assert!(Article::from_raw(raw(None)).is_none());
        assert!(Article::from_raw(raw(Some("   "))).is_none());
    }

    #[test]
    fn test_missing_fields_get_fallbacks() {
        let article = Article::from_raw(RawArticle {
            url: Some("https://example.com/b".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(article.image, PLACEHOLDER_IMAGE);
        assert_eq!(article.description, FALLBACK_DESCRIPTION);
        assert_eq!(article.title, FALLBACK_TITLE);
        assert_eq!(article.published_at, DateTime::UNIX_EPOCH);
        assert_eq!(article.source_name(), None);
    }

    #[test]
    fn test_blank_image_uses_placeholder() {
        let mut entry = raw(Some("https://example.com/c"));
        entry.image = Some("".into());
        assert_eq!(Article::from_raw(entry).unwrap().image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_control_characters_are_stripped() {
        let mut entry = raw(Some("https://example.com/d"));
        entry.title = Some("\x1b[2JBreaking".into());
        assert_eq!(Article::from_raw(entry).unwrap().title, "Breaking");
    }

    #[test]
    fn test_identity_is_url() {
        let a = Article::from_raw(raw(Some("https://example.com/same"))).unwrap();
        let mut other = raw(Some("https://example.com/same"));
        other.title = Some("Different".into());
        let b = Article::from_raw(other).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serializes_with_upstream_field_names() {
        let article = Article::from_raw(raw(Some("https://example.com/e"))).unwrap();
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["publishedAt"], "2024-10-21T07:28:00Z");
        assert_eq!(json["source"]["name"], "Example Times");
    }

    #[test]
    fn test_parse_headlines_counts_dropped() {
        let body = br#"{"totalArticles": 3, "articles": [
            {"url": "https://example.com/1", "publishedAt": "2024-01-01T00:00:00Z"},
            {"title": "no url"},
            {"url": "https://example.com/2"}
        ]}"#;
        let page = parse_headlines(body).unwrap();
        assert_eq!(page.total_articles, Some(3));
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.dropped, 1);
    }

    #[test]
    fn test_parse_headlines_without_articles_key() {
        let page = parse_headlines(b"{}").unwrap();
        assert!(page.articles.is_empty());
    }

    #[test]
    fn test_parse_headlines_null_articles_is_empty_page() {
        let page = parse_headlines(br#"{"totalArticles": 0, "articles": null}"#).unwrap();
        assert!(page.articles.is_empty());
        assert_eq!(page.dropped, 0);
        assert_eq!(page.total_articles, Some(0));
    }

    #[test]
    fn test_parse_headlines_skips_malformed_entries() {
        let body = br#"{"articles": [
            {"url": "https://e.com/1", "title": "ok"},
            {"url": "https://e.com/2", "image": 123},
            {"url": "https://e.com/3", "title": 42},
            "not an object",
            {"url": "https://e.com/4", "title": "also ok"}
        ]}"#;
        let page = parse_headlines(body).unwrap();
        let urls: Vec<_> = page.articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://e.com/1", "https://e.com/4"]);
        assert_eq!(page.dropped, 3);
    }

    #[test]
    fn test_reading_time_at_least_one_minute() {
        let article = Article::from_raw(raw(Some("https://example.com/f"))).unwrap();
        assert_eq!(article.reading_time(), 1);
    }
}
