use std::fmt;
use std::str::FromStr;

/// Headline categories the upstream API understands, in menu order.
pub const CATEGORIES: [&str; 7] = [
    "general",
    "business",
    "entertainment",
    "health",
    "science",
    "sports",
    "technology",
];

pub const DEFAULT_CATEGORY: &str = "general";

/// Result ordering requested from upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    PublishedAt,
    Relevancy,
}

impl SortOrder {
    /// Wire and preference value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PublishedAt => "publishedAt",
            Self::Relevancy => "relevancy",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PublishedAt => "Latest",
            Self::Relevancy => "Relevance",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::PublishedAt => Self::Relevancy,
            Self::Relevancy => Self::PublishedAt,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publishedAt" => Ok(Self::PublishedAt),
            "relevancy" => Ok(Self::Relevancy),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

/// What the feed is currently showing. Changing any field starts a fresh
/// accumulation from page 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: String,
    pub search_term: String,
    pub sort_order: SortOrder,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            search_term: String::new(),
            sort_order: SortOrder::default(),
        }
    }
}

impl FeedQuery {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    /// Search text as sent upstream, or `None` when blank.
    pub fn search(&self) -> Option<&str> {
        let term = self.search_term.trim();
        (!term.is_empty()).then_some(term)
    }
}

/// One page fetch issued by the controller.
///
/// `generation` identifies the controller state that asked for it; results
/// carrying an older generation are discarded on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: FeedQuery,
    pub page: u32,
    pub generation: u64,
}
