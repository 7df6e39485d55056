//! canto: a terminal feed reader.
//!
//! Stories are grouped into [`tag::Tag`]s and shown by
//! [`view::ViewController`], a scrollable multi-column list with a single
//! selection cursor. Views live on a [`view::ViewStack`] driven by the event
//! loop in [`ui`].

pub mod config;
pub mod feeds;
pub mod keybindings;
pub mod launcher;
pub mod story;
pub mod tag;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view;
