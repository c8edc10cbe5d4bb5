use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::news::Article;

// ============================================================================
// Storage keys
// ============================================================================

pub const BOOKMARKS_KEY: &str = "news-app-bookmarks";
pub const THEME_KEY: &str = "news-app-theme";
pub const CATEGORY_KEY: &str = "news-app-category";
pub const SORT_ORDER_KEY: &str = "news-app-sort-order";
pub const SEARCH_TERM_KEY: &str = "news-app-search-term";
pub const RECENTLY_VIEWED_KEY: &str = "news-app-recently-viewed";
pub const PREFERENCES_KEY: &str = "news-app-preferences";
pub const CURRENT_ARTICLES_KEY: &str = "current-articles";

/// Every key the store owns. `clear_all_data` removes all of them.
pub const STORAGE_KEYS: [&str; 8] = [
    BOOKMARKS_KEY,
    THEME_KEY,
    CATEGORY_KEY,
    SORT_ORDER_KEY,
    SEARCH_TERM_KEY,
    RECENTLY_VIEWED_KEY,
    PREFERENCES_KEY,
    CURRENT_ARTICLES_KEY,
];

/// Most-recent-first cap on the recently viewed list.
pub const RECENTLY_VIEWED_LIMIT: usize = 20;

// ============================================================================
// Persisted records
// ============================================================================

/// A saved article. Serialized flat: the article fields plus `bookmarkedAt`
/// (epoch milliseconds).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    #[serde(flatten)]
    pub article: Article,
    pub bookmarked_at: i64,
}

/// An entry in the recently viewed log, with `viewedAt` in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentlyViewed {
    #[serde(flatten)]
    pub article: Article,
    pub viewed_at: i64,
}

// ============================================================================
// Preferences
// ============================================================================

pub const PREF_THEME: &str = "theme";
pub const PREF_CATEGORY: &str = "category";
pub const PREF_SORT_ORDER: &str = "sortOrder";
pub const PREF_SEARCH_TERM: &str = "searchTerm";

const DEFAULT_THEME: &str = "light";
const DEFAULT_CATEGORY: &str = "general";
const DEFAULT_SORT_ORDER: &str = "publishedAt";

/// Flat setting-name to value mapping. Last write wins per key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserPreferences(BTreeMap<String, String>);

impl Default for UserPreferences {
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(PREF_THEME.to_string(), DEFAULT_THEME.to_string());
        map.insert(PREF_CATEGORY.to_string(), DEFAULT_CATEGORY.to_string());
        map.insert(PREF_SORT_ORDER.to_string(), DEFAULT_SORT_ORDER.to_string());
        map.insert(PREF_SEARCH_TERM.to_string(), String::new());
        Self(map)
    }
}

impl UserPreferences {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn theme(&self) -> &str {
        self.get(PREF_THEME).unwrap_or(DEFAULT_THEME)
    }

    pub fn category(&self) -> &str {
        self.get(PREF_CATEGORY).unwrap_or(DEFAULT_CATEGORY)
    }

    pub fn sort_order(&self) -> &str {
        self.get(PREF_SORT_ORDER).unwrap_or(DEFAULT_SORT_ORDER)
    }

    pub fn search_term(&self) -> &str {
        self.get(PREF_SEARCH_TERM).unwrap_or("")
    }
}

// ============================================================================
// Saved-articles view helpers
// ============================================================================

/// Ordering options for the saved articles view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BookmarkSort {
    /// Newest bookmark first.
    #[default]
    Recent,
    Oldest,
    /// Alphabetical, case-insensitive.
    Title,
}

impl BookmarkSort {
    pub fn next(self) -> Self {
        match self {
            Self::Recent => Self::Oldest,
            Self::Oldest => Self::Title,
            Self::Title => Self::Recent,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Recent => "Most recent",
            Self::Oldest => "Oldest first",
            Self::Title => "Title",
        }
    }

    pub fn sort(self, bookmarks: &mut [Bookmark]) {
        match self {
            Self::Recent => bookmarks.sort_by(|a, b| b.bookmarked_at.cmp(&a.bookmarked_at)),
            Self::Oldest => bookmarks.sort_by(|a, b| a.bookmarked_at.cmp(&b.bookmarked_at)),
            Self::Title => bookmarks.sort_by_cached_key(|b| b.article.title.to_lowercase()),
        }
    }
}

/// Bookmarks whose title or description contains `query`, case-insensitively.
/// An empty or whitespace-only query matches everything.
pub fn filter_bookmarks<'a>(bookmarks: &'a [Bookmark], query: &str) -> Vec<&'a Bookmark> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return bookmarks.iter().collect();
    }
    bookmarks
        .iter()
        .filter(|b| {
            b.article.title.to_lowercase().contains(&needle)
                || b.article.description.to_lowercase().contains(&needle)
        })
        .collect()
}
