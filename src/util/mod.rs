//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **Endpoint validation**: HTTPS enforcement for configured endpoints and
//!   sanity checks on feed owner ids
//! - **Text processing**: whitespace collapsing, word capping and
//!   char-boundary-safe truncation
//!
//! # Examples
//!
//! ```
//! use inkfeed::util::{truncate_words, validate_endpoint};
//!
//! let url = validate_endpoint("https://medium.com/feed").unwrap();
//! assert_eq!(url.host_str(), Some("medium.com"));
//!
//! assert_eq!(truncate_words("a b c d", 2), "a b...");
//! ```

mod text;
mod url_validator;

pub use text::{collapse_whitespace, truncate_chars, truncate_words, word_count, ELLIPSIS};
pub use url_validator::{validate_endpoint, validate_owner_id, UrlValidationError};
