use super::view::ViewModel;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the feed list panel
pub fn render(f: &mut Frame, model: &ViewModel, area: Rect) {
    let width = area.width.saturating_sub(2) as usize;

    let items: Vec<ListItem> = if model.feeds.is_empty() {
        vec![ListItem::new(Span::styled(
            "No feeds yet",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        model
            .feeds
            .iter()
            .map(|feed| {
                let title = sanitize_line(&feed.title);
                let description = sanitize_line(&feed.description);
                ListItem::new(vec![
                    Line::from(Span::styled(
                        truncate_to_width(&title, width).into_owned(),
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        truncate_to_width(&description, width).into_owned(),
                        Style::default().fg(Color::Gray),
                    )),
                ])
            })
            .collect()
    };

    let title = format!("Feeds ({})", model.feeds.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, area);
}
