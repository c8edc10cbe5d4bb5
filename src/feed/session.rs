use std::future::Future;
use std::sync::Arc;

use super::client::{FetchError, HeadlineClient};
use super::controller::{ApplyOutcome, FeedController};
use super::query::{FeedQuery, PageRequest, SortOrder, CATEGORIES, DEFAULT_CATEGORY};
use crate::news::HeadlinesPage;
use crate::storage::{LocalStore, PREF_CATEGORY, PREF_SEARCH_TERM, PREF_SORT_ORDER};

/// A [`FeedController`] wired to the proxy client and the local store.
///
/// Query changes are persisted as preferences, and every applied page is
/// snapshotted into the current-articles entry so the detail view can
/// resolve articles without refetching.
pub struct FeedSession {
    controller: FeedController,
    client: Arc<HeadlineClient>,
    store: LocalStore,
}

impl FeedSession {
    /// Build a session from stored preferences.
    ///
    /// `category_override` (e.g. from the command line) wins over the stored
    /// category. Unknown stored values fall back to defaults.
    pub fn restore(
        client: Arc<HeadlineClient>,
        store: LocalStore,
        category_override: Option<&str>,
    ) -> Self {
        let prefs = store.user_preferences();

        let category = category_override.unwrap_or(prefs.category());
        let category = if CATEGORIES.contains(&category) {
            category.to_string()
        } else {
            tracing::warn!(category, "Unknown category, using default");
            DEFAULT_CATEGORY.to_string()
        };

        let sort_order = prefs.sort_order().parse::<SortOrder>().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring stored sort order");
            SortOrder::default()
        });

        let query = FeedQuery {
            category,
            search_term: prefs.search_term().to_string(),
            sort_order,
        };

        Self {
            controller: FeedController::new(query),
            client,
            store,
        }
    }

    pub fn controller(&self) -> &FeedController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FeedController {
        &mut self.controller
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    pub fn start(&mut self) -> PageRequest {
        self.controller.start()
    }

    pub fn change_category(&mut self, category: &str) -> PageRequest {
        self.store.save_user_preference(PREF_CATEGORY, category);
        self.controller.set_category(category)
    }

    /// Apply debounced search text.
    pub fn change_search(&mut self, term: &str) -> PageRequest {
        self.store.save_user_preference(PREF_SEARCH_TERM, term);
        self.controller.set_search_term(term)
    }

    pub fn change_sort(&mut self, order: SortOrder) -> PageRequest {
        self.store.save_user_preference(PREF_SORT_ORDER, order.as_str());
        self.controller.set_sort_order(order)
    }

    pub fn load_more(&mut self) -> PageRequest {
        self.controller.load_more()
    }

    pub fn reload(&mut self) -> PageRequest {
        self.controller.reload()
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// A detached future that performs `request`. Suitable for
    /// `tokio::spawn`; hand the output back to [`apply`](Self::apply).
    pub fn fetch(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = (PageRequest, Result<HeadlinesPage, FetchError>)> + Send + 'static {
        let client = Arc::clone(&self.client);
        async move {
            let result = client.fetch_page(&request.query, request.page).await;
            (request, result)
        }
    }

    pub fn apply(
        &mut self,
        request: &PageRequest,
        result: Result<HeadlinesPage, FetchError>,
    ) -> ApplyOutcome {
        let outcome = self.controller.apply(request, result);
        if outcome == ApplyOutcome::Applied {
            self.store.save_current_articles(self.controller.articles());
        }
        outcome
    }

    /// Fetch `request` and apply it inline.
    pub async fn run(&mut self, request: PageRequest) -> ApplyOutcome {
        let (request, result) = self.fetch(request).await;
        self.apply(&request, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::ClientSettings;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Arc<HeadlineClient> {
        Arc::new(
            HeadlineClient::new(ClientSettings {
                backend_url: format!("{}/api", server.uri()),
                ..Default::default()
            })
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_restore_uses_stored_preferences() {
        let server = MockServer::start().await;
        let store = LocalStore::in_memory();
        store.save_user_preferences([
            ("category", "science"),
            ("sortOrder", "relevancy"),
            ("searchTerm", "mars"),
        ]);

        let session = FeedSession::restore(client_for(&server), store, None);
        let query = session.controller().query();
        assert_eq!(query.category, "science");
        assert_eq!(query.sort_order, SortOrder::Relevancy);
        assert_eq!(query.search_term, "mars");
    }

    #[tokio::test]
    async fn test_restore_override_and_invalid_values() {
        let server = MockServer::start().await;
        let store = LocalStore::in_memory();
        store.save_user_preferences([("category", "astrology"), ("sortOrder", "random")]);

        let session = FeedSession::restore(client_for(&server), store.clone(), None);
        assert_eq!(session.controller().query().category, "general");
        assert_eq!(session.controller().query().sort_order, SortOrder::PublishedAt);

        let session = FeedSession::restore(client_for(&server), store, Some("health"));
        assert_eq!(session.controller().query().category, "health");
    }

    #[tokio::test]
    async fn test_changes_persist_preferences() {
        let server = MockServer::start().await;
        let store = LocalStore::in_memory();
        let mut session = FeedSession::restore(client_for(&server), store.clone(), None);

        session.change_category("sports");
        session.change_sort(SortOrder::Relevancy);
        session.change_search("cricket");

        let prefs = store.user_preferences();
        assert_eq!(prefs.category(), "sports");
        assert_eq!(prefs.sort_order(), "relevancy");
        assert_eq!(prefs.search_term(), "cricket");
    }

    #[tokio::test]
    async fn test_applied_page_is_snapshotted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("category", "general"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"articles": [{"title": "Hello", "url": "https://e.com/hello"}]}"#,
            ))
            .mount(&server)
            .await;

        let store = LocalStore::in_memory();
        let mut session = FeedSession::restore(client_for(&server), store.clone(), None);
        let req = session.start();
        assert_eq!(session.run(req).await, ApplyOutcome::Applied);

        let snapshot = store.current_articles();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].title, "Hello");
    }

    #[tokio::test]
    async fn test_stale_result_not_snapshotted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"articles": [{"url": "https://e.com/x"}]}"#,
            ))
            .mount(&server)
            .await;

        let store = LocalStore::in_memory();
        let mut session = FeedSession::restore(client_for(&server), store.clone(), None);
        let stale = session.start();
        let _current = session.change_category("business");

        let (req, result) = session.fetch(stale).await;
        assert_eq!(session.apply(&req, result), ApplyOutcome::Stale);
        assert!(store.current_articles().is_empty());
    }
}
