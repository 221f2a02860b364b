use std::collections::HashSet;
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Session-unique feed identifier, issued by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedId(pub u64);

/// Session-unique post identifier, issued by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(pub u64);

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Feeds and Posts
// ============================================================================

/// A subscribed source. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feed {
    pub id: FeedId,
    pub url: String,
    pub title: String,
    pub description: String,
}

/// One entry parsed from a feed.
///
/// `feed_id` is a weak reference: the post does not own its feed.
/// For merge purposes a post is identified by its `title` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub feed_id: FeedId,
    pub title: String,
    pub description: String,
    pub link: String,
}

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Reason a submitted URL was rejected before any fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    Required,
    Malformed,
    Duplicate,
}

/// User-visible error categories carried by form and loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Submitted URL failed required/format/uniqueness check
    Validation(ValidationKind),
    /// Fetch failed or timed out
    Network,
    /// Fetched content is not a parseable feed
    InvalidResource,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorKind::Validation(ValidationKind::Required) => "URL must not be empty",
            ErrorKind::Validation(ValidationKind::Malformed) => "URL must be a valid http(s) link",
            ErrorKind::Validation(ValidationKind::Duplicate) => "RSS already exists",
            ErrorKind::Network => "Network error",
            ErrorKind::InvalidResource => "Resource does not contain valid RSS",
            ErrorKind::Unknown => "Unknown error",
        };
        f.write_str(msg)
    }
}

// ============================================================================
// Process State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Filling,
    Processing,
    Failed,
}

/// Transient state of the submission form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub status: FormStatus,
    pub error: Option<ErrorKind>,
    pub is_valid: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            status: FormStatus::Filling,
            error: None,
            is_valid: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// Outcome of the most recent fetch/parse/merge attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingState {
    pub status: LoadingStatus,
    pub error: Option<ErrorKind>,
}

/// Presentation-only state. `seen_posts` never shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UiState {
    pub selected_post: Option<PostId>,
    pub seen_posts: HashSet<PostId>,
}

// ============================================================================
// State Tree
// ============================================================================

/// The full session state tree.
///
/// Read access is public; writes go through [`Store`](super::Store) so that
/// every mutation produces a change event.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub(super) feeds: Vec<Feed>,
    pub(super) posts: Vec<Post>,
    pub(super) form: FormState,
    pub(super) loading: LoadingState,
    pub(super) ui: UiState,
}

impl State {
    /// Feeds, newest first.
    pub fn feeds(&self) -> &[Feed] {
        &self.feeds
    }

    /// Posts in reverse order of discovery.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn loading(&self) -> &LoadingState {
        &self.loading
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn feed_urls(&self) -> Vec<String> {
        self.feeds.iter().map(|f| f.url.clone()).collect()
    }

    pub fn find_post(&self, id: PostId) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn is_seen(&self, id: PostId) -> bool {
        self.ui.seen_posts.contains(&id)
    }
}
