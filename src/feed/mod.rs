//! Feed retrieval, parsing and the polling pipeline.
//!
//! - [`proxy`] - rewrites feed URLs through the fetch proxy
//! - [`fetcher`] - the [`FeedFetcher`] seam and its reqwest implementation
//! - [`parser`] - RSS/Atom parsing via `feed-rs`
//! - [`poller`] - add-feed flow, refresh rounds and title deduplication
//! - [`refresh`] - the self-rescheduling background loop
//!
//! # Example
//!
//! ```ignore
//! let poller = Poller::new(store, Arc::new(HttpFetcher::new(&config)?), &config);
//! poller.add_feed("https://example.com/rss").await?;
//! let refresh = spawn_refresh_loop(poller.clone(), config.poll_interval());
//! // ...
//! refresh.shutdown().await;
//! ```

pub mod fetcher;
pub mod parser;
pub mod poller;
pub mod proxy;
pub mod refresh;

#[cfg(test)]
pub(crate) mod testing;

pub use fetcher::{FeedFetcher, FetchError, HttpFetcher};
pub use parser::{parse_feed, ParseError, ParsedChannel, ParsedFeed, ParsedPost};
pub use poller::{merge_new_posts, AddFeedError, FeedError, Poller, RoundReport};
pub use proxy::ProxyUrlBuilder;
pub use refresh::{spawn_refresh_loop, RefreshHandle};
