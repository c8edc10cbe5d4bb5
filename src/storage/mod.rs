//! Local persistence for user state.
//!
//! [`LocalStore`] owns the JSON documents for bookmarks, the recently viewed
//! log, preferences, and the current-articles snapshot. It sits on a
//! pluggable [`KeyValueStore`] backend ([`FileStore`] on disk, [`MemoryStore`]
//! for tests and ephemeral sessions).

mod backend;
mod store;
mod types;

use thiserror::Error;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use store::{LocalStore, StoreEvent};
pub use types::{
    filter_bookmarks, Bookmark, BookmarkSort, RecentlyViewed, UserPreferences, BOOKMARKS_KEY,
    CATEGORY_KEY, CURRENT_ARTICLES_KEY, PREFERENCES_KEY, PREF_CATEGORY, PREF_SEARCH_TERM,
    PREF_SORT_ORDER, PREF_THEME, RECENTLY_VIEWED_KEY, RECENTLY_VIEWED_LIMIT, SEARCH_TERM_KEY,
    SORT_ORDER_KEY, STORAGE_KEYS, THEME_KEY,
};

/// Backend-level failures. [`LocalStore`] logs and absorbs these.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidKey(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}
