use std::collections::BTreeSet;

use chrono::{DateTime, Local, TimeZone};

use super::client::FetchError;
use super::filter::{apply_filters, unique_sources, DateFilter};
use super::query::{FeedQuery, PageRequest, SortOrder};
use crate::news::{Article, HeadlinesPage};

/// Whether a completed fetch was folded into the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// A newer request was issued after this one; the result was dropped.
    Stale,
}

/// In-memory feed state for one (category, search, sort) session.
///
/// The controller never performs I/O. Every state change that needs data
/// returns a [`PageRequest`]; the caller fetches it and hands the result
/// back through [`apply`](Self::apply).
#[derive(Debug)]
pub struct FeedController {
    query: FeedQuery,
    articles: Vec<Article>,
    page: u32,
    has_more: bool,
    loading: bool,
    error: Option<String>,
    generation: u64,
    date_filter: DateFilter,
    selected_sources: BTreeSet<String>,
    visible: Vec<Article>,
}

impl FeedController {
    pub fn new(query: FeedQuery) -> Self {
        Self {
            query,
            articles: Vec::new(),
            page: 1,
            has_more: true,
            loading: false,
            error: None,
            generation: 0,
            date_filter: DateFilter::All,
            selected_sources: BTreeSet::new(),
            visible: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// Accumulated articles, newest first.
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Accumulated articles after the date and source filters.
    pub fn visible(&self) -> &[Article] {
        &self.visible
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn date_filter(&self) -> DateFilter {
        self.date_filter
    }

    pub fn selected_sources(&self) -> &BTreeSet<String> {
        &self.selected_sources
    }

    /// Source names present in the accumulated list, sorted.
    pub fn available_sources(&self) -> Vec<String> {
        unique_sources(&self.articles)
    }

    /// Whether a "load more" affordance should be offered.
    pub fn can_load_more(&self) -> bool {
        self.has_more && !self.loading && !self.articles.is_empty()
    }

    // ========================================================================
    // Query transitions
    // ========================================================================

    /// Request page 1 of the current query without changing it.
    pub fn start(&mut self) -> PageRequest {
        self.reset_and_request()
    }

    pub fn set_category(&mut self, category: impl Into<String>) -> PageRequest {
        self.query.category = category.into();
        self.reset_and_request()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> PageRequest {
        self.query.search_term = term.into();
        self.reset_and_request()
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> PageRequest {
        self.query.sort_order = order;
        self.reset_and_request()
    }

    /// Drop the accumulated list and refetch page 1.
    pub fn reload(&mut self) -> PageRequest {
        self.reset_and_request()
    }

    /// Request the next page, keeping what has been accumulated.
    ///
    /// Not blocked when `has_more` is false; the UI decides whether to
    /// offer it.
    pub fn load_more(&mut self) -> PageRequest {
        self.page += 1;
        self.issue()
    }

    fn reset_and_request(&mut self) -> PageRequest {
        self.articles.clear();
        self.page = 1;
        self.has_more = true;
        self.refresh_filters();
        self.issue()
    }

    fn issue(&mut self) -> PageRequest {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        PageRequest {
            query: self.query.clone(),
            page: self.page,
            generation: self.generation,
        }
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Fold a completed fetch into the feed.
    ///
    /// Page 1 replaces the list and later pages append; the merged list is
    /// then stably re-sorted by publication time, newest first. Pages are
    /// assumed disjoint by upstream contract, so an article repeated across
    /// pages is kept twice.
    ///
    /// A failed fetch counts as an empty page: accumulated articles stay,
    /// `has_more` turns false, and the error message is recorded.
    pub fn apply(
        &mut self,
        request: &PageRequest,
        result: Result<HeadlinesPage, FetchError>,
    ) -> ApplyOutcome {
        self.apply_at(request, result, &Local::now())
    }

    /// [`apply`](Self::apply) with an explicit clock for the date filter.
    pub fn apply_at<Tz: TimeZone>(
        &mut self,
        request: &PageRequest,
        result: Result<HeadlinesPage, FetchError>,
        now: &DateTime<Tz>,
    ) -> ApplyOutcome {
        if request.generation != self.generation {
            tracing::debug!(
                request_generation = request.generation,
                current_generation = self.generation,
                "Discarding stale page result"
            );
            return ApplyOutcome::Stale;
        }

        self.loading = false;
        // Entries dropped during normalization still count toward has-more
        let (incoming, has_more) = match result {
            Ok(page) => {
                let has_more = !page.articles.is_empty() || page.dropped > 0;
                (page.articles, has_more)
            }
            Err(e) => {
                tracing::warn!(
                    category = %request.query.category,
                    page = request.page,
                    error = %e,
                    "Headline fetch failed"
                );
                self.error = Some(e.user_message());
                (Vec::new(), false)
            }
        };

        self.has_more = has_more;
        if request.page <= 1 {
            self.articles = incoming;
        } else {
            self.articles.extend(incoming);
        }
        self.articles
            .sort_by(|a, b| b.published_at.cmp(&a.published_at));

        self.refresh_filters_at(now);
        ApplyOutcome::Applied
    }

    // ========================================================================
    // Filters
    // ========================================================================

    pub fn set_date_filter(&mut self, filter: DateFilter) {
        self.date_filter = filter;
        self.refresh_filters();
    }

    /// Add `name` to the source selection, or remove it if present.
    pub fn toggle_source(&mut self, name: &str) {
        if !self.selected_sources.remove(name) {
            self.selected_sources.insert(name.to_string());
        }
        self.refresh_filters();
    }

    pub fn clear_sources(&mut self) {
        self.selected_sources.clear();
        self.refresh_filters();
    }

    pub fn select_all_sources(&mut self) {
        self.selected_sources = self.available_sources().into_iter().collect();
        self.refresh_filters();
    }

    /// Recompute the visible list against the local clock. Call on a tick so
    /// relative windows roll over at midnight.
    pub fn refresh_filters(&mut self) {
        self.refresh_filters_at(&Local::now());
    }

    pub fn refresh_filters_at<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) {
        self.visible = apply_filters(&self.articles, &self.date_filter, &self.selected_sources, now);
    }
}
