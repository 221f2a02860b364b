use super::screen::{Focus, Screen};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, screen: &Screen, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some(msg) = screen.status() {
        Cow::Borrowed(msg)
    } else if screen.show_preview {
        Cow::Borrowed("[o]pen [Esc]close")
    } else {
        match screen.focus {
            Focus::Input => Cow::Borrowed("[Enter]add feed [Tab]posts [Esc]clear [Ctrl+C]quit"),
            Focus::Posts => {
                Cow::Borrowed("[j/k]move [Enter]preview [o]pen [r]efresh [Tab]input [q]uit")
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
