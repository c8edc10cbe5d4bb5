use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;

use super::backend::{FileStore, KeyValueStore, MemoryStore};
use super::types::{
    Bookmark, RecentlyViewed, UserPreferences, BOOKMARKS_KEY, CURRENT_ARTICLES_KEY,
    PREFERENCES_KEY, RECENTLY_VIEWED_KEY, RECENTLY_VIEWED_LIMIT, STORAGE_KEYS,
};
use super::StorageError;
use crate::news::Article;
use crate::util::decode_route_id;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Published after every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    BookmarksChanged { count: usize },
    RecentlyViewedChanged,
    PreferenceChanged { key: String },
    CurrentArticlesChanged,
    Cleared,
}

/// User state persistence: bookmarks, recently viewed, preferences, and the
/// current-articles snapshot.
///
/// Backend failures never escape. Reads fall back to a default and writes
/// report `false`; the cause is logged. Each read-modify-write runs under
/// one process-wide lock per store, so clones sharing a backend cannot
/// interleave updates.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
    events: broadcast::Sender<StoreEvent>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend,
            write_lock: Arc::new(Mutex::new(())),
            events,
        }
    }

    /// File-backed store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::new(Arc::new(FileStore::open(dir)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Receive change notifications. Events published before this call are
    /// not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.read(BOOKMARKS_KEY).unwrap_or_default()
    }

    pub fn bookmark_count(&self) -> usize {
        self.bookmarks().len()
    }

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks().iter().any(|b| b.article.url == url)
    }

    /// Append a bookmark stamped with the current time.
    ///
    /// Returns `false` without writing when the url is already bookmarked or
    /// the write fails.
    pub fn save_bookmark(&self, article: &Article) -> bool {
        let _guard = self.lock();
        let mut bookmarks: Vec<Bookmark> = self.read(BOOKMARKS_KEY).unwrap_or_default();
        if bookmarks.iter().any(|b| b.article.url == article.url) {
            return false;
        }
        bookmarks.push(Bookmark {
            article: article.clone(),
            bookmarked_at: now_millis(),
        });
        self.write_and_notify(BOOKMARKS_KEY, &bookmarks, || StoreEvent::BookmarksChanged {
            count: bookmarks.len(),
        })
    }

    /// Remove every bookmark with this url. Returns `true` only when
    /// something was removed and the result persisted.
    pub fn remove_bookmark(&self, url: &str) -> bool {
        let _guard = self.lock();
        let mut bookmarks: Vec<Bookmark> = self.read(BOOKMARKS_KEY).unwrap_or_default();
        let before = bookmarks.len();
        bookmarks.retain(|b| b.article.url != url);
        if bookmarks.len() == before {
            return false;
        }
        self.write_and_notify(BOOKMARKS_KEY, &bookmarks, || StoreEvent::BookmarksChanged {
            count: bookmarks.len(),
        })
    }

    /// Delete every bookmark.
    pub fn clear_bookmarks(&self) -> bool {
        let _guard = self.lock();
        self.write_and_notify(BOOKMARKS_KEY, &Vec::<Bookmark>::new(), || {
            StoreEvent::BookmarksChanged { count: 0 }
        })
    }

    // ========================================================================
    // Recently viewed
    // ========================================================================

    /// Most recent first.
    pub fn recently_viewed(&self) -> Vec<RecentlyViewed> {
        self.read(RECENTLY_VIEWED_KEY).unwrap_or_default()
    }

    /// Move `article` to the front of the log, evicting the oldest entries
    /// past the cap.
    pub fn add_to_recently_viewed(&self, article: &Article) -> bool {
        let _guard = self.lock();
        let mut entries: Vec<RecentlyViewed> =
            self.read(RECENTLY_VIEWED_KEY).unwrap_or_default();
        entries.retain(|e| e.article.url != article.url);
        entries.insert(
            0,
            RecentlyViewed {
                article: article.clone(),
                viewed_at: now_millis(),
            },
        );
        entries.truncate(RECENTLY_VIEWED_LIMIT);
        self.write_and_notify(RECENTLY_VIEWED_KEY, &entries, || {
            StoreEvent::RecentlyViewedChanged
        })
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Stored preferences, or the defaults when nothing is stored.
    pub fn user_preferences(&self) -> UserPreferences {
        self.read(PREFERENCES_KEY).unwrap_or_default()
    }

    pub fn save_user_preference(&self, key: &str, value: &str) -> bool {
        self.save_user_preferences([(key, value)])
    }

    /// Merge several settings in one write. Emits one `PreferenceChanged`
    /// per key.
    pub fn save_user_preferences<'a, I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let _guard = self.lock();
        let mut prefs = self.user_preferences();
        let mut changed = Vec::new();
        for (key, value) in values {
            prefs.insert(key, value);
            changed.push(key.to_string());
        }
        if !self.write(PREFERENCES_KEY, &prefs) {
            return false;
        }
        for key in changed {
            let _ = self.events.send(StoreEvent::PreferenceChanged { key });
        }
        true
    }

    // ========================================================================
    // Current articles snapshot
    // ========================================================================

    pub fn save_current_articles(&self, articles: &[Article]) -> bool {
        let _guard = self.lock();
        self.write_and_notify(CURRENT_ARTICLES_KEY, &articles, || {
            StoreEvent::CurrentArticlesChanged
        })
    }

    pub fn current_articles(&self) -> Vec<Article> {
        self.read(CURRENT_ARTICLES_KEY).unwrap_or_default()
    }

    /// Look up a detail-view route id in the current-articles snapshot.
    pub fn resolve_article(&self, route_id: &str) -> Option<Article> {
        let url = match decode_route_id(route_id) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(route_id, error = %e, "Undecodable route id");
                return None;
            }
        };
        self.current_articles().into_iter().find(|a| a.url == url)
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Remove every key this store owns. Returns `false` if any removal
    /// failed; the remaining keys are still attempted.
    pub fn clear_all_data(&self) -> bool {
        let _guard = self.lock();
        let mut ok = true;
        for key in STORAGE_KEYS {
            if let Err(e) = self.backend.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove stored key");
                ok = false;
            }
        }
        let _ = self.events.send(StoreEvent::Cleared);
        ok
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read from store");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable stored value");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to encode value for store");
                return false;
            }
        };
        match self.backend.set(key, &encoded) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to write to store");
                false
            }
        }
    }

    fn write_and_notify<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        event: impl FnOnce() -> StoreEvent,
    ) -> bool {
        if !self.write(key, value) {
            return false;
        }
        // No receivers is not an error
        let _ = self.events.send(event());
        true
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::RawArticle;
    use crate::util::encode_route_id;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn article(url: &str) -> Article {
        Article::from_raw(RawArticle {
            title: Some(format!("Title {url}")),
            url: Some(url.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    /// Backend that is permanently unavailable.
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_save_bookmark_is_idempotent() {
        let store = LocalStore::in_memory();
        let a = article("https://example.com/a");

        assert!(store.save_bookmark(&a));
        assert!(!store.save_bookmark(&a));
        assert_eq!(store.bookmark_count(), 1);
        assert!(store.is_bookmarked("https://example.com/a"));
    }

    #[test]
    fn test_bookmarks_keep_insertion_order() {
        let store = LocalStore::in_memory();
        for url in ["https://e.com/1", "https://e.com/2", "https://e.com/3"] {
            store.save_bookmark(&article(url));
        }
        let urls: Vec<String> = store.bookmarks().into_iter().map(|b| b.article.url).collect();
        assert_eq!(urls, vec!["https://e.com/1", "https://e.com/2", "https://e.com/3"]);
    }

    #[test]
    fn test_remove_bookmark() {
        let store = LocalStore::in_memory();
        store.save_bookmark(&article("https://e.com/1"));
        store.save_bookmark(&article("https://e.com/2"));

        assert!(store.remove_bookmark("https://e.com/1"));
        assert!(!store.is_bookmarked("https://e.com/1"));
        assert_eq!(store.bookmark_count(), 1);

        // Removing an unknown url is a no-op
        assert!(!store.remove_bookmark("https://e.com/missing"));
        assert_eq!(store.bookmark_count(), 1);
    }

    #[test]
    fn test_recently_viewed_moves_reviewed_to_front() {
        let store = LocalStore::in_memory();
        store.add_to_recently_viewed(&article("https://e.com/a"));
        store.add_to_recently_viewed(&article("https://e.com/b"));
        store.add_to_recently_viewed(&article("https://e.com/a"));

        let urls: Vec<String> = store
            .recently_viewed()
            .into_iter()
            .map(|e| e.article.url)
            .collect();
        assert_eq!(urls, vec!["https://e.com/a", "https://e.com/b"]);
    }

    #[test]
    fn test_recently_viewed_is_capped() {
        let store = LocalStore::in_memory();
        for i in 0..25 {
            store.add_to_recently_viewed(&article(&format!("https://e.com/{i}")));
        }
        let entries = store.recently_viewed();
        assert_eq!(entries.len(), RECENTLY_VIEWED_LIMIT);
        assert_eq!(entries[0].article.url, "https://e.com/24");
        assert_eq!(entries[19].article.url, "https://e.com/5");
    }

    #[test]
    fn test_preferences_default_and_merge() {
        let store = LocalStore::in_memory();
        assert_eq!(store.user_preferences(), UserPreferences::default());

        assert!(store.save_user_preference("category", "sports"));
        assert!(store.save_user_preferences([("sortOrder", "relevancy"), ("searchTerm", "cup")]));

        let prefs = store.user_preferences();
        assert_eq!(prefs.category(), "sports");
        assert_eq!(prefs.sort_order(), "relevancy");
        assert_eq!(prefs.search_term(), "cup");
        assert_eq!(prefs.theme(), "light");
    }

    #[test]
    fn test_resolve_article_by_route_id() {
        let store = LocalStore::in_memory();
        let a = article("https://example.com/story?id=7");
        let b = article("https://example.com/other");
        store.save_current_articles(&[a.clone(), b]);

        let resolved = store.resolve_article(&encode_route_id(&a.url)).unwrap();
        assert_eq!(resolved.url, a.url);
        assert!(store.resolve_article(&encode_route_id("https://nope")).is_none());
        assert!(store.resolve_article("").is_none());
    }

    #[test]
    fn test_clear_all_data() {
        let store = LocalStore::in_memory();
        store.save_bookmark(&article("https://e.com/1"));
        store.add_to_recently_viewed(&article("https://e.com/1"));
        store.save_user_preference("theme", "dark");
        store.save_current_articles(&[article("https://e.com/1")]);

        assert!(store.clear_all_data());
        assert!(store.bookmarks().is_empty());
        assert!(store.recently_viewed().is_empty());
        assert!(store.current_articles().is_empty());
        assert_eq!(store.user_preferences(), UserPreferences::default());
    }

    #[test]
    fn test_failing_backend_is_absorbed() {
        let store = LocalStore::new(Arc::new(FailingStore));
        let a = article("https://e.com/1");

        assert!(!store.save_bookmark(&a));
        assert!(!store.remove_bookmark(&a.url));
        assert!(!store.is_bookmarked(&a.url));
        assert!(store.bookmarks().is_empty());
        assert!(!store.add_to_recently_viewed(&a));
        assert!(store.recently_viewed().is_empty());
        assert!(!store.save_user_preference("theme", "dark"));
        assert_eq!(store.user_preferences(), UserPreferences::default());
        assert!(!store.save_current_articles(&[a]));
        assert!(!store.clear_all_data());
    }

    #[test]
    fn test_corrupt_value_reads_as_default() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(BOOKMARKS_KEY, "{not json").unwrap();
        let store = LocalStore::new(backend);
        assert!(store.bookmarks().is_empty());
        // A fresh write replaces the corrupt document
        assert!(store.save_bookmark(&article("https://e.com/1")));
        assert_eq!(store.bookmark_count(), 1);
    }

    #[test]
    fn test_events_published_on_writes() {
        let store = LocalStore::in_memory();
        let mut rx = store.subscribe();

        store.save_bookmark(&article("https://e.com/1"));
        store.save_bookmark(&article("https://e.com/2"));
        store.remove_bookmark("https://e.com/1");
        store.add_to_recently_viewed(&article("https://e.com/1"));
        store.save_user_preference("category", "health");
        store.save_current_articles(&[]);
        store.clear_all_data();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                StoreEvent::BookmarksChanged { count: 1 },
                StoreEvent::BookmarksChanged { count: 2 },
                StoreEvent::BookmarksChanged { count: 1 },
                StoreEvent::RecentlyViewedChanged,
                StoreEvent::PreferenceChanged {
                    key: "category".into()
                },
                StoreEvent::CurrentArticlesChanged,
                StoreEvent::Cleared,
            ]
        );
    }

    #[test]
    fn test_duplicate_bookmark_publishes_nothing() {
        let store = LocalStore::in_memory();
        store.save_bookmark(&article("https://e.com/1"));
        let mut rx = store.subscribe();
        store.save_bookmark(&article("https://e.com/1"));
        assert!(rx.try_recv().is_err());
    }

    proptest! {
        #[test]
        fn prop_recently_viewed_bounded_and_unique(ids in proptest::collection::vec(0u8..40, 0..60)) {
            let store = LocalStore::in_memory();
            for id in &ids {
                store.add_to_recently_viewed(&article(&format!("https://e.com/{id}")));
            }
            let entries = store.recently_viewed();
            prop_assert!(entries.len() <= RECENTLY_VIEWED_LIMIT);

            let mut urls: Vec<&str> = entries.iter().map(|e| e.article.url.as_str()).collect();
            if let Some(last) = ids.last() {
                let expected = format!("https://e.com/{last}");
                prop_assert_eq!(urls[0], expected.as_str());
            }
            let len = urls.len();
            urls.sort_unstable();
            urls.dedup();
            prop_assert_eq!(urls.len(), len);
        }
    }
}
