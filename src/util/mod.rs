//! Utility functions shared by the client and the UI.
//!
//! - **URL validation**: checks and normalizes the store's base address
//! - **Text processing**: terminal-safe titles and width-aware truncation

mod text;
mod url_validator;

pub use text::{display_width, sanitize_title, truncate_to_width};
pub use url_validator::{validate_base_url, UrlValidationError};
