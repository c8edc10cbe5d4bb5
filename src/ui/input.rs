//! Input handling for the TUI.
//!
//! Dispatches key presses to the handler for the active overlay, input
//! mode, or view.

use crate::app::{parse_date_range, App, AppEvent, InputMode, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use newshub::util::{validate_url_for_open, MAX_SEARCH_QUERY_LENGTH};
use tokio::sync::mpsc;

use super::events::spawn_fetch;
use super::Action;

const MAX_DATE_INPUT_LENGTH: usize = 32;

pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(Action::Quit);
    }

    // Help overlay captures all keys
    if app.show_help {
        if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return Ok(Action::Continue);
    }

    if app.pending_clear {
        if code == KeyCode::Char('y') {
            app.clear_bookmarks();
        } else {
            app.pending_clear = false;
            app.set_status("Cancelled");
        }
        return Ok(Action::Continue);
    }

    match app.input_mode {
        InputMode::Search => return Ok(handle_search_input(app, code, event_tx)),
        InputMode::DateRange => return Ok(handle_date_input(app, code)),
        InputMode::Sources => return Ok(handle_sources_input(app, code)),
        InputMode::SavedFilter => return Ok(handle_saved_filter_input(app, code)),
        InputMode::Normal => {}
    }

    match app.view {
        View::Headlines => handle_headlines_input(app, code, event_tx),
        View::Detail => Ok(handle_detail_input(app, code)),
        View::Saved => Ok(handle_saved_input(app, code)),
        View::Recent => Ok(handle_recent_input(app, code)),
    }
}

/// Keys shared by the list views and the detail view.
fn handle_common(app: &mut App, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('b') => app.toggle_bookmark(),
        KeyCode::Char('o') => open_selected(app),
        KeyCode::Char('S') => app.share_selected(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('?') => app.show_help = true,
        _ => return false,
    }
    true
}

fn open_selected(app: &mut App) {
    let Some(url) = app.selected_article().map(|a| a.url.clone()) else {
        return;
    };
    match validate_url_for_open(&url) {
        Err(e) => app.set_status(e.to_string()),
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                app.set_status(format!("Failed to open browser: {}", e));
            } else {
                app.set_status("Opening in browser...");
            }
        }
    }
}

fn switch_view(app: &mut App, view: View) {
    app.view = view;
    app.clamp_selection();
}

fn handle_headlines_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if handle_common(app, code) {
        return Ok(Action::Continue);
    }

    match code {
        KeyCode::Char('q') | KeyCode::Esc => return Ok(Action::Quit),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Tab => {
            if let Some(request) = app.next_category() {
                spawn_fetch(app, request, event_tx);
            }
        }
        KeyCode::Char(c @ '1'..='7') => {
            let index = c as usize - '1' as usize;
            if let Some(request) = app.select_category(index) {
                spawn_fetch(app, request, event_tx);
            }
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
        }
        KeyCode::Char('s') => {
            let request = app.toggle_sort();
            spawn_fetch(app, request, event_tx);
        }
        KeyCode::Char('d') => app.cycle_date_filter(),
        KeyCode::Char('D') => {
            app.date_input.clear();
            app.input_mode = InputMode::DateRange;
        }
        KeyCode::Char('f') => {
            if app.session.controller().available_sources().is_empty() {
                app.set_status("No sources to filter");
            } else {
                app.source_cursor = 0;
                app.input_mode = InputMode::Sources;
            }
        }
        KeyCode::Char('m') => {
            if app.session.controller().can_load_more() {
                let request = app.session.load_more();
                spawn_fetch(app, request, event_tx);
            } else if !app.session.controller().has_more() {
                app.set_status("No more articles");
            }
        }
        KeyCode::Char('r') => {
            app.selected = 0;
            let request = app.session.reload();
            app.set_status("Reloading...");
            spawn_fetch(app, request, event_tx);
        }
        KeyCode::Char('B') => switch_view(app, View::Saved),
        KeyCode::Char('v') => switch_view(app, View::Recent),
        _ => {}
    }
    Ok(Action::Continue)
}

/// Typing updates the pending search; it fires after the debounce delay.
/// `Enter` applies immediately, `Esc` restores the active term.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match code {
        KeyCode::Esc => {
            app.search_debounce.cancel();
            app.search_input = app.session.controller().query().search_term.clone();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            let term = app
                .search_debounce
                .flush()
                .unwrap_or_else(|| app.search_input.trim().to_string());
            if let Some(request) = app.apply_search(term) {
                spawn_fetch(app, request, event_tx);
            }
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.queue_search();
        }
        KeyCode::Char(c) => {
            if app.search_input.chars().count() < MAX_SEARCH_QUERY_LENGTH {
                app.search_input.push(c);
                app.queue_search();
            } else {
                app.set_status(format!(
                    "Search query too long (max {} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_date_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => match parse_date_range(&app.date_input) {
            Ok(filter) => {
                app.input_mode = InputMode::Normal;
                app.set_date_filter(filter);
            }
            Err(e) => app.set_status(e),
        },
        KeyCode::Backspace => {
            app.date_input.pop();
        }
        KeyCode::Char(c) if app.date_input.len() < MAX_DATE_INPUT_LENGTH => {
            app.date_input.push(c);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_sources_input(app: &mut App, code: KeyCode) -> Action {
    let count = app.session.controller().available_sources().len();
    match code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('f') => app.input_mode = InputMode::Normal,
        KeyCode::Char('j') | KeyCode::Down => {
            if app.source_cursor + 1 < count {
                app.source_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.source_cursor = app.source_cursor.saturating_sub(1);
        }
        KeyCode::Char(' ') => app.toggle_source_at_cursor(),
        KeyCode::Char('a') => {
            app.session.controller_mut().select_all_sources();
            app.clamp_selection();
        }
        KeyCode::Char('x') => {
            app.session.controller_mut().clear_sources();
            app.clamp_selection();
        }
        _ => {}
    }
    Action::Continue
}

fn handle_detail_input(app: &mut App, code: KeyCode) -> Action {
    if handle_common(app, code) {
        return Action::Continue;
    }
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Esc | KeyCode::Backspace => app.close_detail(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.detail_scroll = app.detail_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.detail_scroll = app.detail_scroll.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

fn handle_saved_input(app: &mut App, code: KeyCode) -> Action {
    if handle_common(app, code) {
        return Action::Continue;
    }
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Esc => switch_view(app, View::Headlines),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('/') => app.input_mode = InputMode::SavedFilter,
        KeyCode::Char('s') => app.cycle_saved_sort(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_bookmark(),
        KeyCode::Char('X') => {
            if !app.saved.is_empty() {
                app.pending_clear = true;
                app.set_status("Clear all bookmarks? (y/n)");
            }
        }
        KeyCode::Char('v') => switch_view(app, View::Recent),
        _ => {}
    }
    Action::Continue
}

fn handle_saved_filter_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc => {
            app.saved_query.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.saved_query.pop();
        }
        KeyCode::Char(c) if app.saved_query.chars().count() < MAX_SEARCH_QUERY_LENGTH => {
            app.saved_query.push(c);
        }
        _ => {}
    }
    app.saved_selected = 0;
    Action::Continue
}

fn handle_recent_input(app: &mut App, code: KeyCode) -> Action {
    if handle_common(app, code) {
        return Action::Continue;
    }
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Esc => switch_view(app, View::Headlines),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('B') => switch_view(app, View::Saved),
        _ => {}
    }
    Action::Continue
}
