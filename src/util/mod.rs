//! Utility functions shared across the crate.
//!
//! - **URL validation**: required/format/uniqueness checks for submitted feed
//!   URLs, plus an SSRF guard against private hosts
//! - **Text processing**: terminal-width aware truncation and sanitizing of
//!   feed-supplied text
//! - **Task helpers**: panic capture for long-lived background loops

mod task;
mod text;
mod url_validator;

pub use task::catch_task_panic;
pub use text::{display_width, sanitize_line, truncate_to_width};
pub use url_validator::{validate_feed_url, validate_link_for_open, ValidationError};
