use crate::app::{App, InputMode, View};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar: input prompt, transient message, or key hints.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, style): (Cow<'_, str>, _) = match app.input_mode {
        InputMode::Search => (
            Cow::Owned(format!("Search: {}_", app.search_input)),
            app.palette.input,
        ),
        InputMode::DateRange => (
            Cow::Owned(format!("Date range (YYYY-MM-DD YYYY-MM-DD): {}_", app.date_input)),
            app.palette.input,
        ),
        InputMode::SavedFilter => (
            Cow::Owned(format!("Filter saved: {}_", app.saved_query)),
            app.palette.input,
        ),
        InputMode::Sources => (
            Cow::Borrowed("[Space]toggle [a]ll [x]clear [Esc]done"),
            app.palette.status_bar,
        ),
        InputMode::Normal => {
            let text = if let Some((msg, _)) = &app.status_message {
                Cow::Borrowed(msg.as_ref())
            } else {
                Cow::Borrowed(match app.view {
                    View::Headlines => {
                        "[Tab]category [/]search [s]ort [d]ate [f]sources [m]ore [b]ookmark [B]saved [?]help [q]uit"
                    }
                    View::Detail => "[Esc]back [j/k]scroll [b]ookmark [o]pen [S]hare [t]heme [q]uit",
                    View::Saved => "[Esc]back [/]filter [s]ort [d]elete [X]clear all [Enter]open [q]uit",
                    View::Recent => "[Esc]back [Enter]open [b]ookmark [B]saved [q]uit",
                })
            };
            (text, app.palette.status_bar)
        }
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}
