use crate::app::App;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::headlines::format_published;

/// Render the article detail view.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let p = &app.palette;

    let Some(article) = app.detail.as_ref() else {
        let paragraph = Paragraph::new("Article not found")
            .block(Block::default().borders(Borders::ALL).title("Article"));
        f.render_widget(paragraph, area);
        return;
    };

    let saved = if app.is_bookmarked(&article.url) {
        Span::styled("★ Bookmarked", p.bookmark_marker)
    } else {
        Span::styled("[b] Bookmark", p.muted)
    };

    let mut lines = vec![
        Line::from(Span::styled(article.title.as_str(), p.title)),
        Line::from(Span::styled(
            format!(
                "{} · {} · {} min read",
                article.source_name().unwrap_or("Unknown source"),
                format_published(article.published_at),
                article.reading_time()
            ),
            p.meta,
        )),
        Line::from(saved),
        Line::from(""),
    ];
    lines.extend(
        article
            .description
            .lines()
            .map(|l| Line::from(Span::styled(l, p.description))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Link: ", p.muted),
        Span::raw(article.url.as_str()),
    ]));
    if let Some(site) = article.source.url.as_deref() {
        lines.push(Line::from(vec![
            Span::styled("Source: ", p.muted),
            Span::raw(site),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press o to read the full story in your browser.",
        p.muted,
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(p.border_focused)
                .title(" Article "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));

    f.render_widget(paragraph, area);
}
