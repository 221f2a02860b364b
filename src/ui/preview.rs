use super::view::Preview;
use crate::util::sanitize_line;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the post preview as a centered overlay
pub fn render(f: &mut Frame, preview: &Preview) {
    let area = f.area();
    let width = 80u16.min(area.width.saturating_sub(4));
    let height = 20u16.min(area.height.saturating_sub(4));
    if width < 10 || height < 5 {
        return;
    }
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    let mut lines = vec![
        Line::from(Span::styled(
            sanitize_line(&preview.title).into_owned(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            sanitize_line(&preview.link).into_owned(),
            Style::default().fg(Color::Blue),
        )),
        Line::from(""),
    ];
    if preview.description.is_empty() {
        lines.push(Line::from(Span::styled(
            "No description",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.extend(
            preview
                .description
                .lines()
                .map(|l| Line::from(sanitize_line(l).into_owned())),
        );
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Preview ")
                .title_bottom(" (o) Open in browser  (Esc) Close "),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
