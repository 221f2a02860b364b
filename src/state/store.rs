use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

use super::events::{StateEvent, Subscriber, SubscriptionId};
use super::types::{
    ErrorKind, Feed, FeedId, FormStatus, LoadingStatus, Post, PostId, State,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A feed with this URL is already subscribed.
    #[error("Feed already exists: {0}")]
    DuplicateUrl(String),
}

/// A post ready for insertion; the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub feed_id: FeedId,
    pub title: String,
    pub description: String,
    pub link: String,
}

// ============================================================================
// Store
// ============================================================================

/// Single source of truth for the session.
///
/// Every method that changes the state tree emits exactly one [`StateEvent`]
/// to each subscriber, after the change is applied. Writes that leave the
/// tree unchanged emit nothing.
pub struct Store {
    state: State,
    subscribers: Vec<(SubscriptionId, Box<dyn Subscriber>)>,
    /// Titles of every stored post, kept in step with `state.posts`.
    titles: HashSet<String>,
    next_feed_id: u64,
    next_post_id: u64,
    next_subscription_id: u64,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: State::default(),
            subscribers: Vec::new(),
            titles: HashSet::new(),
            next_feed_id: 1,
            next_post_id: 1,
            next_subscription_id: 1,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id);
        self.next_subscription_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// True if any stored post carries exactly this title.
    pub fn contains_title(&self, title: &str) -> bool {
        self.titles.contains(title)
    }

    // ------------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------------

    /// Creates a feed with a fresh id and prepends it to `feeds`.
    ///
    /// # Errors
    ///
    /// [`StoreError::DuplicateUrl`] if a feed with `url` already exists. The
    /// state is left untouched and no event is emitted.
    pub fn add_feed(
        &mut self,
        url: &str,
        title: String,
        description: String,
    ) -> Result<FeedId, StoreError> {
        if self.state.feeds.iter().any(|f| f.url == url) {
            return Err(StoreError::DuplicateUrl(url.to_string()));
        }

        let id = FeedId(self.next_feed_id);
        self.next_feed_id += 1;

        self.state.feeds.insert(
            0,
            Feed {
                id,
                url: url.to_string(),
                title,
                description,
            },
        );
        self.emit(StateEvent::FeedAdded { feed_id: id });
        Ok(id)
    }

    /// Prepends a batch of posts, keeping the batch's relative order.
    ///
    /// No filtering happens here: callers that need title deduplication
    /// check [`contains_title`](Self::contains_title) first.
    pub fn prepend_posts(&mut self, batch: Vec<NewPost>) -> Vec<PostId> {
        if batch.is_empty() {
            return Vec::new();
        }

        let posts: Vec<Post> = batch
            .into_iter()
            .map(|p| {
                let id = PostId(self.next_post_id);
                self.next_post_id += 1;
                Post {
                    id,
                    feed_id: p.feed_id,
                    title: p.title,
                    description: p.description,
                    link: p.link,
                }
            })
            .collect();

        let ids: Vec<PostId> = posts.iter().map(|p| p.id).collect();
        self.titles.extend(posts.iter().map(|p| p.title.clone()));
        self.state.posts.splice(0..0, posts);

        self.emit(StateEvent::PostsAdded {
            post_ids: ids.clone(),
        });
        ids
    }

    // ------------------------------------------------------------------------
    // Scalars
    // ------------------------------------------------------------------------

    pub fn set_form_status(&mut self, status: FormStatus) {
        if self.state.form.status != status {
            self.state.form.status = status;
            self.emit(StateEvent::FormStatusChanged { status });
        }
    }

    pub fn set_form_error(&mut self, error: Option<ErrorKind>) {
        if self.state.form.error != error {
            self.state.form.error = error;
            self.emit(StateEvent::FormErrorChanged { error });
        }
    }

    pub fn set_form_validity(&mut self, is_valid: bool) {
        if self.state.form.is_valid != is_valid {
            self.state.form.is_valid = is_valid;
            self.emit(StateEvent::FormValidityChanged { is_valid });
        }
    }

    pub fn set_loading_status(&mut self, status: LoadingStatus) {
        if self.state.loading.status != status {
            self.state.loading.status = status;
            self.emit(StateEvent::LoadingStatusChanged { status });
        }
    }

    pub fn set_loading_error(&mut self, error: Option<ErrorKind>) {
        if self.state.loading.error != error {
            self.state.loading.error = error;
            self.emit(StateEvent::LoadingErrorChanged { error });
        }
    }

    // ------------------------------------------------------------------------
    // UI
    // ------------------------------------------------------------------------

    pub fn select_post(&mut self, post_id: PostId) {
        if self.state.ui.selected_post != Some(post_id) {
            self.state.ui.selected_post = Some(post_id);
            self.emit(StateEvent::PostSelected { post_id });
        }
    }

    /// Records a post as seen. The seen set only grows.
    pub fn mark_seen(&mut self, post_id: PostId) {
        if self.state.ui.seen_posts.insert(post_id) {
            self.emit(StateEvent::PostSeen { post_id });
        }
    }

    fn emit(&mut self, event: StateEvent) {
        tracing::trace!(path = event.path(), subscribers = self.subscribers.len(), "State changed");
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber.on_change(&self.state, &event);
        }
    }
}

// ============================================================================
// Shared Handle
// ============================================================================

/// Cloneable handle that serializes every access to one [`Store`].
///
/// The lock is held only for the duration of a closure and never across an
/// await point. Subscribers run while the lock is held, so they must not
/// call back into the handle.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Runs `f` with exclusive access to the store.
    pub fn update<R>(&self, f: impl FnOnce(&mut Store) -> R) -> R {
        // A panicking subscriber leaves the tree consistent (events fire after
        // the write), so a poisoned lock is still safe to reuse.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Runs `f` against the current state.
    pub fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        self.update(|store| f(store.state()))
    }
}
