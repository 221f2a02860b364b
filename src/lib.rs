//! feedpulse: a terminal RSS aggregator.
//!
//! Feeds are added through a validated form, fetched through a CORS-style
//! proxy, and re-polled on a fixed interval. New entries are deduplicated by
//! title and merged into a single observable [`state::Store`]; the terminal
//! UI is just one subscriber of that store.

pub mod app;
pub mod config;
pub mod feed;
pub mod state;
pub mod ui;
pub mod util;
