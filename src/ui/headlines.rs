use crate::app::App;
use chrono::{DateTime, Local, Utc};
use newshub::news::Article;
use newshub::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const PREVIEW_CHARS: usize = 140;

/// Local publication time, or "Unknown date" for the epoch fallback.
pub fn format_published(published: DateTime<Utc>) -> String {
    if published == DateTime::UNIX_EPOCH {
        return "Unknown date".to_string();
    }
    published
        .with_timezone(&Local)
        .format("%b %d, %Y %H:%M")
        .to_string()
}

/// Three-line list entry: title, metadata, description preview.
pub fn article_item<'a>(
    app: &App,
    article: &'a Article,
    width: u16,
    extra_meta: Option<String>,
) -> ListItem<'a> {
    let p = &app.palette;
    let width = usize::from(width.saturating_sub(4));

    let mut title_spans = Vec::with_capacity(2);
    if app.is_bookmarked(&article.url) {
        title_spans.push(Span::styled("★ ", p.bookmark_marker));
    }
    title_spans.push(Span::styled(
        truncate_to_width(&article.title, width.saturating_sub(2)),
        p.title,
    ));

    let mut meta = format!(
        "{} · {} · {} min read",
        article.source_name().unwrap_or("Unknown source"),
        format_published(article.published_at),
        article.reading_time()
    );
    if let Some(extra) = extra_meta {
        meta.push_str(" · ");
        meta.push_str(&extra);
    }

    let description = article.description_preview(PREVIEW_CHARS);
    ListItem::new(vec![
        Line::from(title_spans),
        Line::from(Span::styled(truncate_to_width(&meta, width).into_owned(), p.meta)),
        Line::from(Span::styled(
            truncate_to_width(&description, width).into_owned(),
            p.description,
        )),
    ])
}

/// Render the headline list with the error banner and paging footer.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let p = &app.palette;
    let controller = app.session.controller();

    let title = format!(
        " {} ({} of {}) ",
        controller.query().category,
        controller.visible().len(),
        controller.articles().len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(p.border_focused)
        .title(title);

    if controller.articles().is_empty() {
        let (text, style) = if controller.is_loading() {
            ("Loading headlines...".to_string(), p.muted)
        } else if let Some(err) = controller.error() {
            (format!("{err}\n\nPress r to retry."), p.error)
        } else {
            ("No articles found.".to_string(), p.muted)
        };
        f.render_widget(
            Paragraph::new(text)
                .style(style)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    if controller.visible().is_empty() {
        f.render_widget(
            Paragraph::new("No articles match the current filters.\n\nPress d to change the date range or f to adjust sources.")
                .style(p.muted)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
        return;
    }

    let mut items: Vec<ListItem> = controller
        .visible()
        .iter()
        .map(|article| article_item(app, article, area.width, None))
        .collect();

    let footer = if controller.is_loading() {
        Some(Span::styled("  Loading...", p.muted))
    } else if controller.has_more() {
        Some(Span::styled("  [m] Load more", p.muted))
    } else {
        None
    };
    if let Some(footer) = footer {
        items.push(ListItem::new(Line::from(footer)));
    }

    let list = List::new(items).block(block).highlight_style(p.selected);
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}
