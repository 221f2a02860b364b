use super::screen::{Focus, Screen};
use super::view::ViewModel;
use crate::util::{sanitize_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the post list panel
pub fn render(f: &mut Frame, model: &ViewModel, screen: &Screen, area: Rect) {
    let is_focused = screen.focus == Focus::Posts;
    // Leave room for borders and the unread marker
    let width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = if model.posts.is_empty() {
        vec![ListItem::new(Span::styled(
            "No posts",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        model
            .posts
            .iter()
            .map(|post| {
                let title = sanitize_line(&post.title);
                let title = truncate_to_width(&title, width).into_owned();
                let (marker, style) = if post.seen {
                    ("  ", Style::default().fg(Color::Gray))
                } else {
                    (
                        "● ",
                        Style::default().add_modifier(Modifier::BOLD),
                    )
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Cyan)),
                    Span::styled(title, style),
                ]))
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!("Posts ({})", model.posts.len())),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    if !model.posts.is_empty() {
        state.select(Some(screen.selected));
    }
    f.render_stateful_widget(list, area, &mut state);
}
