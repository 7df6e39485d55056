//! Terminal User Interface module.
//!
//! - `loop_runner` - main event loop, background reloads, terminal setup
//! - `render` - frame rendering with a minimum-size guard
//!
//! Everything drawn inside the frame belongs to [`crate::view`].

mod loop_runner;
mod render;

pub use loop_runner::{run, AppEvent};
