//! Session state and change notification.
//!
//! [`Store`] owns the state tree (feeds, posts, form, loading process and UI
//! selection) and exposes typed mutation methods. Each applied mutation is
//! announced as a [`StateEvent`] to every registered [`Subscriber`],
//! synchronously and in issuance order.
//!
//! Tasks share one store through [`SharedStore`], which serializes mutations
//! so that notification order matches mutation order even when the add-feed
//! flow and a refresh round are in flight together.

mod events;
mod store;
mod types;

pub use events::{StateEvent, Subscriber, SubscriptionId};
pub use store::{NewPost, SharedStore, Store, StoreError};
pub use types::{
    ErrorKind, Feed, FeedId, FormState, FormStatus, LoadingState, LoadingStatus, Post, PostId,
    State, UiState, ValidationKind,
};
