use super::types::{ErrorKind, FeedId, FormStatus, LoadingStatus, PostId, State};

/// Change notification emitted by the store after a mutation is fully applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// A feed was prepended to `feeds`.
    FeedAdded { feed_id: FeedId },
    /// A batch of posts was prepended to `posts`, in display order.
    PostsAdded { post_ids: Vec<PostId> },
    FormStatusChanged { status: FormStatus },
    FormErrorChanged { error: Option<ErrorKind> },
    FormValidityChanged { is_valid: bool },
    LoadingStatusChanged { status: LoadingStatus },
    LoadingErrorChanged { error: Option<ErrorKind> },
    PostSelected { post_id: PostId },
    PostSeen { post_id: PostId },
}

impl StateEvent {
    /// Name of the top-level region this event touches.
    pub fn path(&self) -> &'static str {
        match self {
            StateEvent::FeedAdded { .. } => "feeds",
            StateEvent::PostsAdded { .. } => "posts",
            StateEvent::FormStatusChanged { .. } => "form.status",
            StateEvent::FormErrorChanged { .. } => "form.error",
            StateEvent::FormValidityChanged { .. } => "form.isValid",
            StateEvent::LoadingStatusChanged { .. } => "loadingProcess.status",
            StateEvent::LoadingErrorChanged { .. } => "loadingProcess.error",
            StateEvent::PostSelected { .. } => "ui.selectedPostId",
            StateEvent::PostSeen { .. } => "ui.seenPostIds",
        }
    }
}

/// Receives change events synchronously, in issuance order.
///
/// `state` is the post-mutation state; implementations must not assume any
/// event carries a diff beyond what the variant names.
pub trait Subscriber: Send {
    fn on_change(&mut self, state: &State, event: &StateEvent);
}

impl<F> Subscriber for F
where
    F: FnMut(&State, &StateEvent) + Send,
{
    fn on_change(&mut self, state: &State, event: &StateEvent) {
        self(state, event)
    }
}

/// Token returned by [`Store::subscribe`](super::Store::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(super) u64);
