//! Utility functions shared by the views.
//!
//! - **Text**: Unicode-aware width, truncation and control-character stripping
//!   for untrusted feed text
//! - **URLs**: scheme check before a link goes to an external opener

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_url_for_open, UrlValidationError};

/// Longest search pattern the prompt accepts.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
