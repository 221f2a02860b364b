use crate::config::{Config, PollFailurePolicy};
use crate::feed::fetcher::{FeedFetcher, FetchError};
use crate::feed::parser::{parse_feed, ParseError, ParsedFeed, ParsedPost};
use crate::state::{
    ErrorKind, FeedId, FormStatus, LoadingStatus, NewPost, PostId, SharedStore, Store, StoreError,
    ValidationKind,
};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Why a single feed could not be turned into posts.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::Fetch(e) => e.kind(),
            FeedError::Parse(e) => e.kind(),
        }
    }
}

/// Why [`Poller::add_feed`] did not add anything.
#[derive(Debug, Error)]
pub enum AddFeedError {
    #[error(transparent)]
    Feed(#[from] FeedError),
    /// Another submission for the same URL finished first.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AddFeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AddFeedError::Feed(e) => e.kind(),
            AddFeedError::Store(StoreError::DuplicateUrl(_)) => {
                ErrorKind::Validation(ValidationKind::Duplicate)
            }
        }
    }
}

/// Outcome counts of one refresh round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundReport {
    /// Feeds attempted.
    pub polled: usize,
    /// Feeds whose fetch or parse failed.
    pub failed: usize,
    /// Posts that survived deduplication and were stored.
    pub added: usize,
}

/// Fetch → parse → merge pipeline over the shared store.
pub struct Poller<F> {
    store: SharedStore,
    fetcher: Arc<F>,
    policy: PollFailurePolicy,
    max_concurrent: usize,
    /// Set while a round failure is shown on the loading state.
    surfaced: Arc<AtomicBool>,
}

impl<F> Clone for Poller<F> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            fetcher: Arc::clone(&self.fetcher),
            policy: self.policy,
            max_concurrent: self.max_concurrent,
            surfaced: Arc::clone(&self.surfaced),
        }
    }
}

impl<F: FeedFetcher> Poller<F> {
    pub fn new(store: SharedStore, fetcher: Arc<F>, config: &Config) -> Self {
        Self {
            store,
            fetcher,
            policy: config.poll_failure_policy,
            max_concurrent: config.max_concurrent_fetches.max(1),
            surfaced: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Subscribes a new feed: fetch, parse, then store the feed and its
    /// posts. Posts whose title is already stored, or repeated within the
    /// document, are skipped so titles stay unique.
    ///
    /// On failure the loading process is marked failed with the error kind
    /// and feeds/posts are left untouched. Once added, the feed is picked up
    /// by the next refresh round because rounds snapshot the feed list.
    pub async fn add_feed(&self, url: &str) -> Result<FeedId, AddFeedError> {
        self.store.update(|store| {
            // This attempt now owns the loading state
            self.surfaced.store(false, Ordering::SeqCst);
            store.set_loading_error(None);
            store.set_loading_status(LoadingStatus::Loading);
        });

        let parsed = match fetch_and_parse(&*self.fetcher, url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(feed = %url, error = %e, "Failed to add feed");
                let err = AddFeedError::from(e);
                self.mark_loading_failed(err.kind());
                return Err(err);
            }
        };

        let ParsedFeed { feed, posts } = parsed;

        let result = self.store.update(|store| {
            let feed_id = store.add_feed(url, feed.title, feed.description)?;
            let added = merge_new_posts(store, vec![(feed_id, posts)]).len();
            store.set_loading_status(LoadingStatus::Success);
            store.set_form_status(FormStatus::Filling);
            Ok::<_, StoreError>((feed_id, added))
        });

        match result {
            Ok((feed_id, post_count)) => {
                tracing::info!(
                    feed = %url,
                    feed_id = %feed_id,
                    posts = post_count,
                    "Feed added; included in subsequent refresh rounds"
                );
                Ok(feed_id)
            }
            Err(e) => {
                tracing::warn!(feed = %url, error = %e, "Feed was added concurrently");
                let err = AddFeedError::from(e);
                self.mark_loading_failed(err.kind());
                Err(err)
            }
        }
    }

    /// Runs one refresh round over every known feed.
    ///
    /// Fetches run in parallel (bounded by `max_concurrent_fetches`); a
    /// failing feed never affects the others. After every attempt settles,
    /// posts whose title is already stored are dropped and the survivors
    /// are prepended as one batch, in feed order then document order.
    pub async fn poll_round(&self) -> RoundReport {
        let feeds: Vec<(FeedId, String)> = self
            .store
            .read(|state| state.feeds().iter().map(|f| (f.id, f.url.clone())).collect());

        if feeds.is_empty() {
            return RoundReport::default();
        }

        let polled = feeds.len();
        let fetcher = &*self.fetcher;

        // `buffered` yields results in feed order regardless of completion order
        let results: Vec<(FeedId, String, Result<ParsedFeed, FeedError>)> = stream::iter(feeds)
            .map(move |(feed_id, url)| async move {
                let result = fetch_and_parse(fetcher, &url).await;
                (feed_id, url, result)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let mut fetched = Vec::with_capacity(results.len());
        let mut first_failure: Option<ErrorKind> = None;
        let mut failed = 0;

        for (feed_id, url, result) in results {
            match result {
                Ok(parsed) => fetched.push((feed_id, parsed.posts)),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(feed = %url, feed_id = %feed_id, error = %e, "Feed refresh failed");
                    first_failure.get_or_insert(e.kind());
                }
            }
        }

        let added = self.store.update(|store| {
            let added = merge_new_posts(store, fetched).len();
            if self.policy == PollFailurePolicy::Surface {
                self.surface_round_outcome(store, first_failure);
            }
            added
        });

        let report = RoundReport {
            polled,
            failed,
            added,
        };
        tracing::debug!(
            polled = report.polled,
            failed = report.failed,
            added = report.added,
            "Refresh round complete"
        );
        report
    }

    /// Shows a failed round on the loading state, and takes it back down
    /// once a later round succeeds for every feed. An add in flight owns
    /// the loading state and is left alone.
    fn surface_round_outcome(&self, store: &mut Store, failure: Option<ErrorKind>) {
        match failure {
            Some(kind) => {
                if store.state().loading().status == LoadingStatus::Loading {
                    tracing::debug!(error = %kind, "Add in progress, not surfacing round failure");
                    return;
                }
                store.set_loading_error(Some(kind));
                store.set_loading_status(LoadingStatus::Failed);
                store.set_form_validity(false);
                self.surfaced.store(true, Ordering::SeqCst);
            }
            None => {
                if !self.surfaced.swap(false, Ordering::SeqCst) {
                    return;
                }
                store.set_loading_error(None);
                store.set_loading_status(LoadingStatus::Idle);
                // A rejected submission keeps its own invalid marker
                if store.state().form().status != FormStatus::Failed {
                    store.set_form_validity(true);
                }
            }
        }
    }

    fn mark_loading_failed(&self, kind: ErrorKind) {
        self.store.update(|store| {
            store.set_loading_error(Some(kind));
            store.set_loading_status(LoadingStatus::Failed);
        });
    }
}

/// Merges freshly fetched posts into the store, skipping known titles.
///
/// A title counts as known if any stored post carries it when the merge
/// starts, or if an earlier post of this same merge already claimed it.
/// Survivors are prepended in one batch that keeps the order of `fetched`
/// and, within each feed, document order. Returns the new post ids.
pub fn merge_new_posts(store: &mut Store, fetched: Vec<(FeedId, Vec<ParsedPost>)>) -> Vec<PostId> {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut batch = Vec::new();

    for (feed_id, posts) in fetched {
        for post in posts {
            if store.contains_title(&post.title) || !claimed.insert(post.title.clone()) {
                continue;
            }
            batch.push(NewPost {
                feed_id,
                title: post.title,
                description: post.description,
                link: post.link,
            });
        }
    }

    store.prepend_posts(batch)
}

async fn fetch_and_parse<F: FeedFetcher>(fetcher: &F, url: &str) -> Result<ParsedFeed, FeedError> {
    let document = fetcher.fetch(url).await?;
    Ok(parse_feed(&document)?)
}
