//! Saved articles and recently viewed lists.

use crate::app::{App, InputMode};
use chrono::DateTime;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::headlines::{article_item, format_published};

fn millis_label(prefix: &str, millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => format!("{prefix} {}", format_published(dt)),
        None => prefix.to_string(),
    }
}

pub fn render_saved(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let p = &app.palette;
    let visible = app.saved_visible();

    let mut title = format!(
        " Saved articles ({}) · {} ",
        app.saved.len(),
        app.saved_sort.label()
    );
    if app.input_mode == InputMode::SavedFilter || !app.saved_query.is_empty() {
        title.push_str(&format!("· filter: {} ", app.saved_query));
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_focused)
        .title(title);

    if visible.is_empty() {
        let text = if app.saved.is_empty() {
            "No saved articles yet.\n\nPress b on any headline to bookmark it."
        } else {
            "No saved articles match the filter."
        };
        f.render_widget(
            Paragraph::new(text)
                .style(p.muted)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = visible
        .iter()
        .map(|b| {
            article_item(
                app,
                &b.article,
                area.width,
                Some(millis_label("saved", b.bookmarked_at)),
            )
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(p.selected);
    let mut state = ListState::default().with_selected(Some(app.saved_selected));
    f.render_stateful_widget(list, area, &mut state);
}

pub fn render_recent(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let p = &app.palette;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_focused)
        .title(format!(" Recently viewed ({}) ", app.recent.len()));

    if app.recent.is_empty() {
        f.render_widget(
            Paragraph::new("Nothing viewed yet.").style(p.muted).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = app
        .recent
        .iter()
        .map(|r| {
            article_item(
                app,
                &r.article,
                area.width,
                Some(millis_label("viewed", r.viewed_at)),
            )
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(p.selected);
    let mut state = ListState::default().with_selected(Some(app.recent_selected));
    f.render_stateful_widget(list, area, &mut state);
}
