//! Terminal User Interface.
//!
//! The store talks to the terminal through one subscriber, [`Renderer`],
//! which keeps a [`ViewModel`] current. The event loop draws that model and
//! turns key presses into session calls.
//!
//! # Module Structure
//!
//! - `view` - store subscriber and the render-ready view model
//! - `screen` - terminal-local state (input text, focus, cursor)
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard input handling
//! - `render` - frame layout
//! - `form` - URL input box and feedback line
//! - `feeds` - feed list widget
//! - `posts` - post list widget
//! - `preview` - post preview overlay
//! - `status` - status bar widget

mod feeds;
mod form;
mod input;
mod loop_runner;
mod posts;
mod preview;
mod render;
mod screen;
mod status;
pub mod view;

pub use input::Action;
pub use loop_runner::run;
pub use view::{renderer, Renderer, ViewHandle, ViewModel};
