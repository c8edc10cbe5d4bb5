//! Render dispatch: header, active view, status bar, and overlays.

use crate::app::{App, InputMode, View};
use newshub::feed::CATEGORIES;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::help::centered_rect;
use super::{detail, headlines, help, saved, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.view {
        View::Headlines => headlines::render(f, app, chunks[1]),
        View::Detail => detail::render(f, app, chunks[1]),
        View::Saved => saved::render_saved(f, app, chunks[1]),
        View::Recent => saved::render_recent(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if app.input_mode == InputMode::Sources {
        render_sources_overlay(f, app);
    }
    if app.show_help {
        help::render(f, app);
    }
}

/// Brand, category tabs, and bookmark badge on the first line; active
/// query and filters on the second.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let controller = app.session.controller();
    let active = app.category_index();

    let mut tabs = vec![Span::styled(" NewsHub ", p.brand)];
    for (i, category) in CATEGORIES.iter().enumerate() {
        let style = if i == active { p.tab_active } else { p.tab_inactive };
        tabs.push(Span::raw(" "));
        tabs.push(Span::styled(format!("{} {}", i + 1, category), style));
    }
    tabs.push(Span::styled(format!("   ★ {}", app.bookmark_count), p.badge));

    let query = controller.query();
    let sources = controller.selected_sources();
    let mut filters = vec![
        Span::styled(" Sort: ", p.muted),
        Span::raw(query.sort_order.label()),
        Span::styled("  Date: ", p.muted),
        Span::raw(controller.date_filter().label()),
        Span::styled("  Sources: ", p.muted),
        Span::raw(if sources.is_empty() {
            "all".to_string()
        } else {
            sources.len().to_string()
        }),
    ];
    if let Some(term) = query.search() {
        filters.push(Span::styled("  Search: ", p.muted));
        filters.push(Span::styled(term.to_string(), p.input));
    }
    if controller.is_loading() {
        filters.push(Span::styled("  loading…", p.muted));
    }

    f.render_widget(
        Paragraph::new(vec![Line::from(tabs), Line::from(filters)]),
        area,
    );
}

fn render_sources_overlay(f: &mut Frame, app: &App) {
    let overlay = centered_rect(50, 60, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }
    f.render_widget(Clear, overlay);

    let controller = app.session.controller();
    let selected = controller.selected_sources();
    let items: Vec<ListItem> = controller
        .available_sources()
        .into_iter()
        .map(|name| {
            let mark = if selected.contains(&name) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {name}"))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.palette.border_focused)
                .title(" Sources "),
        )
        .highlight_style(app.palette.selected);
    let mut state = ListState::default().with_selected(Some(app.source_cursor));
    f.render_stateful_widget(list, overlay, &mut state);
}
