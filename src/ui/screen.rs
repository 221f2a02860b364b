//! Terminal-local state that never goes through the store: the text being
//! typed, which panel has focus, the list cursor and transient status text.

use super::view::ViewModel;
use crate::state::FeedId;
use std::time::{Duration, Instant};

/// Maximum accepted length of the URL input box.
pub(super) const MAX_INPUT_LEN: usize = 2048;

const STATUS_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Posts,
}

#[derive(Debug)]
pub struct Screen {
    pub input: String,
    pub focus: Focus,
    pub selected: usize,
    pub show_preview: bool,
    pub needs_redraw: bool,
    status: Option<(String, Instant)>,
    cleared_for: Option<FeedId>,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            input: String::new(),
            focus: Focus::Input,
            selected: 0,
            show_preview: false,
            needs_redraw: true,
            status: None,
            cleared_for: None,
        }
    }
}

impl Screen {
    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Drops the status message once it has been shown long enough.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status {
            Some((_, at)) if at.elapsed() >= STATUS_TTL => {
                self.status = None;
                true
            }
            _ => false,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.input.len() + c.len_utf8() <= MAX_INPUT_LEN {
            self.input.push(c);
        }
    }

    pub fn select_next(&mut self, len: usize) {
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Brings local state in line with a fresh model snapshot.
    ///
    /// The input box is emptied once per successfully added feed, and the
    /// cursor is kept inside the post list.
    pub fn sync(&mut self, model: &ViewModel) {
        if model.added_feed.is_some() && model.added_feed != self.cleared_for {
            self.cleared_for = model.added_feed;
            self.input.clear();
        }
        self.selected = self.selected.min(model.posts.len().saturating_sub(1));
        if model.preview.is_none() {
            self.show_preview = false;
        }
    }
}
