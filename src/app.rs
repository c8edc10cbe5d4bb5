use std::borrow::Cow;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use newshub::feed::{
    ApplyOutcome, DateFilter, Debouncer, FeedSession, FetchError, PageRequest, SortOrder,
    CATEGORIES,
};
use newshub::news::{Article, HeadlinesPage};
use newshub::storage::{
    filter_bookmarks, Bookmark, BookmarkSort, LocalStore, RecentlyViewed, StoreEvent, PREF_THEME,
};
use newshub::util::encode_route_id;

use crate::clipboard::{share_text, Clipboard, ClipboardError, SystemClipboard};
use crate::theme::{ColorPalette, ThemeVariant};

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Headlines,
    Detail,
    Saved,
    Recent,
}

/// What printable keys currently feed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Headline search, applied after the debounce delay.
    Search,
    /// `YYYY-MM-DD YYYY-MM-DD` custom date range.
    DateRange,
    /// Source picker overlay.
    Sources,
    /// Saved-articles filter, applied on every keystroke.
    SavedFilter,
}

/// Completions of background tasks, delivered to the event loop.
#[derive(Debug)]
pub enum AppEvent {
    PageLoaded {
        request: PageRequest,
        result: Result<HeadlinesPage, FetchError>,
    },
}

pub struct App {
    pub session: FeedSession,
    pub view: View,
    /// Where `Esc` from the detail view returns to.
    pub return_view: View,
    pub input_mode: InputMode,

    // Headline list
    pub selected: usize,
    pub search_input: String,
    pub search_debounce: Debouncer<String>,
    pub date_input: String,
    pub source_cursor: usize,
    /// Local day the date filter was last evaluated against.
    pub filter_day: NaiveDate,

    // Detail
    pub detail: Option<Article>,
    pub detail_scroll: u16,

    // Saved and recent, mirrored from the store on change events
    pub saved: Vec<Bookmark>,
    pub saved_query: String,
    pub saved_sort: BookmarkSort,
    pub saved_selected: usize,
    pub recent: Vec<RecentlyViewed>,
    pub recent_selected: usize,
    pub bookmark_count: usize,
    pub pending_clear: bool,

    pub clipboard: Box<dyn Clipboard>,
    pub show_help: bool,
    pub theme: ThemeVariant,
    pub palette: ColorPalette,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(session: FeedSession) -> Self {
        let store = session.store().clone();
        let prefs = store.user_preferences();
        let theme = ThemeVariant::from_str_name(prefs.theme()).unwrap_or(ThemeVariant::Light);
        let search_input = session.controller().query().search_term.clone();

        let mut app = Self {
            session,
            view: View::Headlines,
            return_view: View::Headlines,
            input_mode: InputMode::Normal,
            selected: 0,
            search_input,
            search_debounce: Debouncer::default(),
            date_input: String::new(),
            source_cursor: 0,
            filter_day: Local::now().date_naive(),
            detail: None,
            detail_scroll: 0,
            saved: Vec::new(),
            saved_query: String::new(),
            saved_sort: BookmarkSort::default(),
            saved_selected: 0,
            recent: Vec::new(),
            recent_selected: 0,
            bookmark_count: 0,
            pending_clear: false,
            clipboard: Box::new(SystemClipboard::default()),
            show_help: false,
            theme,
            palette: theme.palette(),
            status_message: None,
            needs_redraw: true,
        };
        app.reload_saved();
        app.recent = store.recently_viewed();
        app
    }

    pub fn store(&self) -> &LocalStore {
        self.session.store()
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if older than 3 seconds.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    // ========================================================================
    // Feed
    // ========================================================================

    /// Index of the active category in [`CATEGORIES`].
    pub fn category_index(&self) -> usize {
        let current = self.session.controller().query().category.as_str();
        CATEGORIES.iter().position(|c| *c == current).unwrap_or(0)
    }

    /// Switch to `CATEGORIES[index]`. `None` if out of range or already active.
    pub fn select_category(&mut self, index: usize) -> Option<PageRequest> {
        let category = CATEGORIES.get(index)?;
        if index == self.category_index() {
            return None;
        }
        self.selected = 0;
        Some(self.session.change_category(category))
    }

    pub fn next_category(&mut self) -> Option<PageRequest> {
        self.select_category((self.category_index() + 1) % CATEGORIES.len())
    }

    pub fn toggle_sort(&mut self) -> PageRequest {
        let order: SortOrder = self.session.controller().query().sort_order.toggle();
        self.selected = 0;
        self.set_status(format!("Sorted by {}", order.label()));
        self.session.change_sort(order)
    }

    /// Search text changed: restart the debounce timer.
    pub fn queue_search(&mut self) {
        self.search_debounce.push(self.search_input.trim().to_string());
    }

    /// Apply a debounced search term if it differs from the active one.
    pub fn apply_search(&mut self, term: String) -> Option<PageRequest> {
        if term == self.session.controller().query().search_term {
            return None;
        }
        self.selected = 0;
        Some(self.session.change_search(&term))
    }

    /// Feed a page result into the session.
    ///
    /// Returns false for stale results, which leave the screen untouched.
    pub fn apply_page(
        &mut self,
        request: &PageRequest,
        result: Result<HeadlinesPage, FetchError>,
    ) -> bool {
        if self.session.apply(request, result) == ApplyOutcome::Stale {
            tracing::debug!(generation = request.generation, "Discarded stale page");
            return false;
        }
        self.clamp_selection();
        if let Some(err) = self.session.controller().error().map(str::to_string) {
            self.set_status(err);
        }
        true
    }

    pub fn cycle_date_filter(&mut self) {
        let next = self.session.controller().date_filter().next_preset();
        self.set_date_filter(next);
    }

    pub fn set_date_filter(&mut self, filter: DateFilter) {
        self.session.controller_mut().set_date_filter(filter);
        self.selected = 0;
        self.set_status(format!("Date: {}", filter.label()));
    }

    /// Re-evaluate the date filter when the local day rolls over.
    pub fn refresh_filters_if_day_changed(&mut self) -> bool {
        let today = Local::now().date_naive();
        if today == self.filter_day {
            return false;
        }
        self.filter_day = today;
        self.session.controller_mut().refresh_filters();
        self.clamp_selection();
        true
    }

    pub fn toggle_source_at_cursor(&mut self) {
        let sources = self.session.controller().available_sources();
        if let Some(name) = sources.get(self.source_cursor) {
            self.session.controller_mut().toggle_source(name);
            self.clamp_selection();
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    fn list_len(&self) -> usize {
        match self.view {
            View::Headlines => self.session.controller().visible().len(),
            View::Saved => self.saved_visible().len(),
            View::Recent => self.recent.len(),
            View::Detail => 0,
        }
    }

    fn cursor_mut(&mut self) -> Option<&mut usize> {
        match self.view {
            View::Headlines => Some(&mut self.selected),
            View::Saved => Some(&mut self.saved_selected),
            View::Recent => Some(&mut self.recent_selected),
            View::Detail => None,
        }
    }

    pub fn select_next(&mut self) {
        let len = self.list_len();
        if let Some(cursor) = self.cursor_mut() {
            if *cursor + 1 < len {
                *cursor += 1;
            }
        }
    }

    pub fn select_prev(&mut self) {
        if let Some(cursor) = self.cursor_mut() {
            *cursor = cursor.saturating_sub(1);
        }
    }

    pub fn clamp_selection(&mut self) {
        let visible = self.session.controller().visible().len();
        self.selected = self.selected.min(visible.saturating_sub(1));
        let saved = self.saved_visible().len();
        self.saved_selected = self.saved_selected.min(saved.saturating_sub(1));
        self.recent_selected = self.recent_selected.min(self.recent.len().saturating_sub(1));
    }

    /// Article under the cursor in the current view.
    pub fn selected_article(&self) -> Option<&Article> {
        match self.view {
            View::Headlines => self.session.controller().visible().get(self.selected),
            View::Saved => self
                .saved_visible()
                .get(self.saved_selected)
                .copied()
                .map(|b| &b.article),
            View::Recent => self.recent.get(self.recent_selected).map(|r| &r.article),
            View::Detail => self.detail.as_ref(),
        }
    }

    // ========================================================================
    // Detail
    // ========================================================================

    /// Open the selected article and record it as recently viewed.
    ///
    /// Headlines are addressed by route id through the current-articles
    /// snapshot; saved and recent entries carry their own copy.
    pub fn open_detail(&mut self) {
        let Some(article) = self.selected_article().cloned() else {
            return;
        };
        let article = if self.view == View::Headlines {
            let route_id = encode_route_id(&article.url);
            self.store().resolve_article(&route_id).unwrap_or_else(|| {
                tracing::debug!(route_id = %route_id, "Article not in snapshot, using list copy");
                article
            })
        } else {
            article
        };

        self.store().add_to_recently_viewed(&article);
        self.return_view = self.view;
        self.view = View::Detail;
        self.detail = Some(article);
        self.detail_scroll = 0;
    }

    pub fn close_detail(&mut self) {
        self.view = self.return_view;
        self.detail = None;
        self.detail_scroll = 0;
    }

    // ========================================================================
    // Bookmarks and store mirrors
    // ========================================================================

    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.saved.iter().any(|b| b.article.url == url)
    }

    /// Bookmark or un-bookmark the selected article.
    pub fn toggle_bookmark(&mut self) {
        let Some(article) = self.selected_article().cloned() else {
            return;
        };
        if self.store().is_bookmarked(&article.url) {
            if self.store().remove_bookmark(&article.url) {
                self.set_status("Removed from bookmarks");
            } else {
                self.set_status("Failed to remove bookmark");
            }
        } else if self.store().save_bookmark(&article) {
            self.set_status("Article bookmarked");
        } else {
            self.set_status("Failed to save bookmark");
        }
    }

    /// Copy the selected article's title and url to the clipboard.
    pub fn share_selected(&mut self) {
        let Some(text) = self
            .selected_article()
            .map(|a| share_text(&a.title, &a.url))
        else {
            return;
        };
        match self.clipboard.set_text(&text) {
            Ok(()) => self.set_status("Article shared successfully!"),
            Err(ClipboardError::Unavailable(e)) => {
                tracing::warn!(error = %e, "Clipboard unavailable");
                self.set_status("Share feature not supported on this terminal");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to share article");
                self.set_status("Failed to share article");
            }
        }
    }

    /// Bookmarks matching the saved-view filter, in the chosen order.
    pub fn saved_visible(&self) -> Vec<&Bookmark> {
        filter_bookmarks(&self.saved, &self.saved_query)
    }

    pub fn cycle_saved_sort(&mut self) {
        self.saved_sort = self.saved_sort.next();
        self.saved_sort.sort(&mut self.saved);
        self.saved_selected = 0;
        self.set_status(format!("Saved: {}", self.saved_sort.label()));
    }

    pub fn delete_selected_bookmark(&mut self) {
        let Some(url) = self
            .saved_visible()
            .get(self.saved_selected)
            .map(|b| b.article.url.clone())
        else {
            return;
        };
        if self.store().remove_bookmark(&url) {
            self.set_status("Removed from bookmarks");
        }
    }

    pub fn clear_bookmarks(&mut self) {
        self.pending_clear = false;
        if self.store().clear_bookmarks() {
            self.set_status("All bookmarks cleared");
        } else {
            self.set_status("Failed to clear bookmarks");
        }
    }

    fn reload_saved(&mut self) {
        self.saved = self.store().bookmarks();
        self.saved_sort.sort(&mut self.saved);
        self.bookmark_count = self.saved.len();
    }

    /// Mirror a store change. Returns true if anything on screen changed.
    pub fn handle_store_event(&mut self, event: StoreEvent) -> bool {
        match event {
            StoreEvent::BookmarksChanged { count } => {
                self.reload_saved();
                self.bookmark_count = count;
            }
            StoreEvent::RecentlyViewedChanged => {
                self.recent = self.store().recently_viewed();
            }
            StoreEvent::Cleared => self.resync_store(),
            StoreEvent::PreferenceChanged { .. } | StoreEvent::CurrentArticlesChanged => {
                return false;
            }
        }
        self.clamp_selection();
        true
    }

    /// Re-read everything mirrored from the store.
    pub fn resync_store(&mut self) {
        self.reload_saved();
        self.recent = self.store().recently_viewed();
        self.clamp_selection();
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.next();
        self.palette = self.theme.palette();
        self.store()
            .save_user_preference(PREF_THEME, self.theme.pref_value());
        self.set_status(format!("Theme: {}", self.theme.name()));
    }
}

/// Parse `YYYY-MM-DD YYYY-MM-DD` (or `..` between the dates) into a custom
/// date filter.
pub fn parse_date_range(input: &str) -> Result<DateFilter, String> {
    let input = input.trim();
    let (start, end) = input
        .split_once("..")
        .or_else(|| input.split_once(char::is_whitespace))
        .ok_or_else(|| "Expected: YYYY-MM-DD YYYY-MM-DD".to_string())?;

    let parse = |s: &str| {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("{}: {}", s.trim(), e))
    };
    Ok(DateFilter::Custom {
        start: parse(start)?,
        end: parse(end)?,
    })
}
