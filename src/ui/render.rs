//! Frame layout: input and feedback on top, feeds beside posts, status bar
//! at the bottom, and the preview overlay when a post is open.

use super::screen::Screen;
use super::view::ViewModel;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame,
};

use super::{feeds, form, posts, preview, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) fn render(f: &mut Frame, model: &ViewModel, screen: &Screen) {
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

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    form::render_input(f, model, screen, rows[0]);
    form::render_feedback(f, model, rows[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[2]);

    feeds::render(f, model, columns[0]);
    posts::render(f, model, screen, columns[1]);
    status::render(f, screen, rows[3]);

    if screen.show_preview {
        if let Some(p) = &model.preview {
            preview::render(f, p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{PostId, State};
    use crate::ui::view::{FeedLine, PostLine, Preview};
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn sample_model() -> ViewModel {
        let mut model = ViewModel::from_state(&State::default());
        model.feeds = vec![FeedLine {
            title: "Lorem feed".into(),
            description: "Daily lorem".into(),
        }];
        model.posts = vec![PostLine {
            id: PostId(1),
            title: "First post".into(),
            link: "https://example.com/1".into(),
            seen: false,
        }];
        model.preview = Some(Preview {
            id: PostId(1),
            title: "First post".into(),
            description: "Body text".into(),
            link: "https://example.com/1".into(),
        });
        model
    }

    #[test]
    fn test_render_lists() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let model = sample_model();
        terminal
            .draw(|f| render(f, &model, &Screen::default()))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Feeds (1)"));
        assert!(text.contains("Lorem feed"));
        assert!(text.contains("Posts (1)"));
        assert!(text.contains("First post"));
        assert!(!text.contains("Body text"));
    }

    #[test]
    fn test_render_preview_overlay() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let model = sample_model();
        let mut screen = Screen::default();
        screen.show_preview = true;
        terminal.draw(|f| render(f, &model, &screen)).unwrap();

        assert!(buffer_text(&terminal).contains("Body text"));
    }

    #[test]
    fn test_render_too_small() {
        let mut terminal = Terminal::new(TestBackend::new(30, 6)).unwrap();
        let model = sample_model();
        terminal
            .draw(|f| render(f, &model, &Screen::default()))
            .unwrap();

        assert!(buffer_text(&terminal).contains("Terminal too small"));
    }
}
