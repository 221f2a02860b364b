//! Store subscriber that keeps a render-ready view model.
//!
//! Each event rebuilds the region it names from the full post-mutation
//! state; nothing is patched incrementally, so applying the same event
//! twice yields the same model. The terminal loop draws whatever the model
//! holds and is woken through [`ViewHandle::changed`].

use crate::state::{
    ErrorKind, FeedId, FormStatus, LoadingStatus, PostId, State, StateEvent, Subscriber,
};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;

pub const MSG_LOADED: &str = "RSS loaded successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedLine {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLine {
    pub id: PostId,
    pub title: String,
    pub link: String,
    pub seen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub link: String,
}

/// Everything the terminal needs to draw, derived from [`State`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub feeds: Vec<FeedLine>,
    pub posts: Vec<PostLine>,
    pub feedback: Option<Feedback>,
    pub input_enabled: bool,
    pub input_invalid: bool,
    /// Newest feed after a successful load; the input box is cleared once per value.
    pub added_feed: Option<FeedId>,
    pub preview: Option<Preview>,
}

impl ViewModel {
    pub fn from_state(state: &State) -> Self {
        let mut model = Self {
            feeds: Vec::new(),
            posts: Vec::new(),
            feedback: None,
            input_enabled: true,
            input_invalid: false,
            added_feed: None,
            preview: None,
        };
        model.render_feeds(state);
        model.render_posts(state);
        model.render_form(state);
        model.render_preview(state);
        model
    }

    pub fn apply(&mut self, state: &State, event: &StateEvent) {
        match event {
            StateEvent::FeedAdded { .. } => {
                self.render_feeds(state);
                self.render_form(state);
            }
            StateEvent::PostsAdded { .. } => self.render_posts(state),
            StateEvent::FormStatusChanged { .. }
            | StateEvent::FormErrorChanged { .. }
            | StateEvent::FormValidityChanged { .. }
            | StateEvent::LoadingStatusChanged { .. }
            | StateEvent::LoadingErrorChanged { .. } => self.render_form(state),
            StateEvent::PostSelected { .. } => self.render_preview(state),
            StateEvent::PostSeen { .. } => {
                self.render_preview(state);
                self.render_posts(state);
            }
        }
    }

    fn render_feeds(&mut self, state: &State) {
        self.feeds = state
            .feeds()
            .iter()
            .map(|f| FeedLine {
                title: f.title.clone(),
                description: f.description.clone(),
            })
            .collect();
    }

    fn render_posts(&mut self, state: &State) {
        self.posts = state
            .posts()
            .iter()
            .map(|p| PostLine {
                id: p.id,
                title: p.title.clone(),
                link: p.link.clone(),
                seen: state.is_seen(p.id),
            })
            .collect();
    }

    fn render_form(&mut self, state: &State) {
        let form = state.form();
        let loading = state.loading();
        let busy = form.status == FormStatus::Processing && loading.status != LoadingStatus::Failed;

        self.input_enabled = !busy;
        self.feedback = if form.status == FormStatus::Failed {
            Some(danger(form.error))
        } else if busy {
            None
        } else {
            match loading.status {
                LoadingStatus::Failed => Some(danger(loading.error)),
                LoadingStatus::Success => Some(Feedback {
                    text: MSG_LOADED.to_string(),
                    tone: Tone::Success,
                }),
                LoadingStatus::Idle | LoadingStatus::Loading => None,
            }
        };
        self.input_invalid = !form.is_valid
            || matches!(self.feedback, Some(Feedback { tone: Tone::Danger, .. }));
        self.added_feed = match loading.status {
            LoadingStatus::Success => state.feeds().first().map(|f| f.id),
            _ => None,
        };
    }

    fn render_preview(&mut self, state: &State) {
        self.preview = state
            .ui()
            .selected_post
            .and_then(|id| state.find_post(id))
            .map(|p| Preview {
                id: p.id,
                title: p.title.clone(),
                description: p.description.clone(),
                link: p.link.clone(),
            });
    }
}

fn danger(error: Option<ErrorKind>) -> Feedback {
    Feedback {
        text: error.unwrap_or(ErrorKind::Unknown).to_string(),
        tone: Tone::Danger,
    }
}

// ============================================================================
// Subscriber / Handle
// ============================================================================

/// The store subscriber half.
pub struct Renderer {
    model: Arc<Mutex<ViewModel>>,
    wake: Arc<Notify>,
}

/// The terminal half: reads snapshots and waits for changes.
#[derive(Clone)]
pub struct ViewHandle {
    model: Arc<Mutex<ViewModel>>,
    wake: Arc<Notify>,
}

/// Creates a renderer seeded from `state` and the handle that observes it.
pub fn renderer(state: &State) -> (Renderer, ViewHandle) {
    let model = Arc::new(Mutex::new(ViewModel::from_state(state)));
    let wake = Arc::new(Notify::new());
    (
        Renderer {
            model: Arc::clone(&model),
            wake: Arc::clone(&wake),
        },
        ViewHandle { model, wake },
    )
}

impl Subscriber for Renderer {
    fn on_change(&mut self, state: &State, event: &StateEvent) {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(state, event);
        self.wake.notify_one();
    }
}

impl ViewHandle {
    pub fn snapshot(&self) -> ViewModel {
        self.model
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Resolves after the next model change (or immediately if one is pending).
    pub async fn changed(&self) {
        self.wake.notified().await;
    }
}
