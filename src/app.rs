use crate::config::Config;
use crate::feed::{spawn_refresh_loop, AddFeedError, FeedFetcher, Poller, RefreshHandle};
use crate::state::{ErrorKind, FeedId, FormStatus, PostId, SharedStore};
use crate::util::{validate_feed_url, ValidationError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why a form submission did not add a feed.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    AddFeed(#[from] AddFeedError),
}

impl SubmitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SubmitError::Validation(e) => ErrorKind::Validation(e.kind()),
            SubmitError::AddFeed(e) => e.kind(),
        }
    }
}

/// One aggregator session: the store plus the flows that mutate it.
///
/// Cloning is cheap; clones share the same store and fetcher, which lets the
/// UI hand a clone to a spawned submission task.
pub struct App<F> {
    store: SharedStore,
    poller: Poller<F>,
    allow_private_hosts: bool,
    poll_interval: Duration,
}

impl<F> Clone for App<F> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            poller: self.poller.clone(),
            allow_private_hosts: self.allow_private_hosts,
            poll_interval: self.poll_interval,
        }
    }
}

impl<F: FeedFetcher> App<F> {
    pub fn new(store: SharedStore, fetcher: Arc<F>, config: &Config) -> Self {
        Self {
            poller: Poller::new(store.clone(), fetcher, config),
            store,
            allow_private_hosts: config.allow_private_hosts,
            poll_interval: config.poll_interval(),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Handles a submitted URL: validate against the current feed set, and
    /// only if that passes, run the add-feed flow.
    ///
    /// Validation failures surface on the form state alone; no fetch is
    /// attempted for them.
    pub async fn submit_url(&self, input: &str) -> Result<FeedId, SubmitError> {
        let known = self.store.update(|store| {
            store.set_form_status(FormStatus::Processing);
            store.state().feed_urls()
        });

        if let Err(e) = validate_feed_url(input, &known, self.allow_private_hosts) {
            tracing::debug!(input = %input, error = %e, "Submission rejected");
            let kind = ErrorKind::Validation(e.kind());
            self.store.update(|store| {
                store.set_form_error(Some(kind));
                store.set_form_validity(false);
                store.set_form_status(FormStatus::Failed);
            });
            return Err(e.into());
        }

        self.store.update(|store| {
            store.set_form_error(None);
            store.set_form_validity(true);
        });

        Ok(self.poller.add_feed(input.trim()).await?)
    }

    /// Marks a post as opened. Returns `false` for an unknown id.
    pub fn open_post(&self, post_id: PostId) -> bool {
        self.store.update(|store| {
            if store.state().find_post(post_id).is_none() {
                return false;
            }
            store.select_post(post_id);
            store.mark_seen(post_id);
            true
        })
    }

    /// Starts the background refresh loop for this session.
    pub fn start_refresh(&self) -> RefreshHandle {
        spawn_refresh_loop(self.poller.clone(), self.poll_interval)
    }
}
