//! Help overlay: keybinding table grouped by view.

use crate::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Headlines",
        &[
            ("1-7 / Tab", "Switch category"),
            ("/", "Search (applies after typing pauses)"),
            ("s", "Toggle latest / relevance"),
            ("d", "Cycle date filter"),
            ("D", "Custom date range"),
            ("f", "Filter by source"),
            ("m", "Load more"),
            ("r", "Reload from page 1"),
            ("Enter", "Open article"),
            ("B / v", "Saved articles / recently viewed"),
        ],
    ),
    (
        "Saved",
        &[
            ("/", "Filter saved articles"),
            ("s", "Change order"),
            ("d", "Remove bookmark"),
            ("X", "Clear all bookmarks"),
        ],
    ),
    (
        "Everywhere",
        &[
            ("j/k", "Move / scroll"),
            ("b", "Bookmark"),
            ("o", "Open in browser"),
            ("S", "Share (copy title and link)"),
            ("t", "Toggle theme"),
            ("Esc", "Back"),
            ("q", "Quit"),
        ],
    ),
];

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(70, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let mut rows: Vec<Row> = Vec::new();
    for (label, bindings) in SECTIONS {
        if !rows.is_empty() {
            rows.push(Row::new(vec![String::new(), String::new()]));
        }
        rows.push(
            Row::new(vec![
                Line::from(Span::styled(
                    format!("-- {} --", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ])
            .style(app.palette.brand),
        );
        for (key, description) in *bindings {
            rows.push(Row::new(vec![format!("  {}", key), description.to_string()]));
        }
    }

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Min(20)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(app.palette.border_focused)
            .title(" Help (? to close) "),
    );
    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
