use super::screen::{Focus, Screen};
use super::view::{Tone, ViewModel};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the URL input box
pub fn render_input(f: &mut Frame, model: &ViewModel, screen: &Screen, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }
    let is_focused = screen.focus == Focus::Input;

    let border_style = if model.input_invalid {
        Style::default().fg(Color::Red)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = if model.input_enabled {
        "RSS link"
    } else {
        "RSS link (loading...)"
    };

    // Keep the tail of long input visible
    let width = area.width.saturating_sub(3) as usize;
    let visible: String = {
        let chars: Vec<char> = screen.input.chars().collect();
        let skip = chars.len().saturating_sub(width);
        chars[skip..].iter().collect()
    };

    let text_style = if model.input_enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if is_focused && model.input_enabled { "_" } else { "" };

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(visible, text_style),
        Span::raw(cursor),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);
}

/// Render the one-line feedback message under the input
pub fn render_feedback(f: &mut Frame, model: &ViewModel, area: Rect) {
    let Some(feedback) = &model.feedback else {
        return;
    };
    let color = match feedback.tone {
        Tone::Success => Color::Green,
        Tone::Danger => Color::Red,
    };
    let text = truncate_to_width(&feedback.text, area.width as usize).into_owned();
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(color)),
        area,
    );
}
