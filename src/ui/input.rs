//! Keyboard handling for the TUI.
//!
//! Key presses only touch [`Screen`]; anything that has to reach the
//! session (submitting, opening a post, refreshing) is returned as an
//! [`Action`] for the event loop to carry out.

use super::screen::{Focus, Screen};
use super::view::ViewModel;
use crate::state::PostId;
use crossterm::event::{KeyCode, KeyModifiers};

/// What the event loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
    /// Submit the typed URL.
    Submit(String),
    /// Show a post in the preview and mark it read.
    OpenPost(PostId),
    /// Open a post link in the system browser.
    OpenLink(String),
    /// Poll all feeds now.
    Refresh,
}

pub(super) fn handle_input(
    screen: &mut Screen,
    model: &ViewModel,
    code: KeyCode,
    modifiers: KeyModifiers,
) -> Action {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if screen.show_preview {
        return handle_preview_input(screen, model, code);
    }

    match screen.focus {
        Focus::Input => handle_form_input(screen, model, code),
        Focus::Posts => handle_list_input(screen, model, code),
    }
}

fn handle_preview_input(screen: &mut Screen, model: &ViewModel, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
            screen.show_preview = false;
            Action::Continue
        }
        KeyCode::Char('o') => match &model.preview {
            Some(preview) => Action::OpenLink(preview.link.clone()),
            None => Action::Continue,
        },
        _ => Action::Continue,
    }
}

fn handle_form_input(screen: &mut Screen, model: &ViewModel, code: KeyCode) -> Action {
    match code {
        KeyCode::Tab => {
            screen.focus = Focus::Posts;
            Action::Continue
        }
        // Typing is ignored while a submission is loading
        _ if !model.input_enabled => Action::Continue,
        KeyCode::Enter => Action::Submit(screen.input.clone()),
        KeyCode::Esc => {
            screen.input.clear();
            Action::Continue
        }
        KeyCode::Backspace => {
            screen.input.pop();
            Action::Continue
        }
        KeyCode::Char(c) => {
            screen.push_char(c);
            Action::Continue
        }
        _ => Action::Continue,
    }
}

fn handle_list_input(screen: &mut Screen, model: &ViewModel, code: KeyCode) -> Action {
    let current = model.posts.get(screen.selected);
    match code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Tab | KeyCode::Char('i') => {
            screen.focus = Focus::Input;
            Action::Continue
        }
        KeyCode::Char('j') | KeyCode::Down => {
            screen.select_next(model.posts.len());
            Action::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            screen.select_prev();
            Action::Continue
        }
        KeyCode::Char('g') | KeyCode::Home => {
            screen.selected = 0;
            Action::Continue
        }
        KeyCode::Char('G') | KeyCode::End => {
            screen.selected = model.posts.len().saturating_sub(1);
            Action::Continue
        }
        KeyCode::Enter => match current {
            Some(post) => {
                screen.show_preview = true;
                Action::OpenPost(post.id)
            }
            None => Action::Continue,
        },
        KeyCode::Char('o') => match current {
            Some(post) => Action::OpenLink(post.link.clone()),
            None => Action::Continue,
        },
        KeyCode::Char('r') => Action::Refresh,
        _ => Action::Continue,
    }
}
