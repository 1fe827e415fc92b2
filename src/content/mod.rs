//! Content normalization for feed items.
//!
//! Raw item markup is arbitrary HTML. This module turns it into the fields
//! an [`Article`](crate::types::Article) carries:
//!
//! - [`document`] - The [`DocumentParser`] capability: structured parsing via
//!   `scraper`, or a null object that forces every fallback
//! - [`extract`] - Entity decoding and plain-text extraction, with a
//!   regex-based fallback
//! - [`derive`] - Summary, read time, snippet, cover image and the per-item
//!   [`derive_article`] entry point

mod derive;
mod document;
mod extract;

pub use derive::{
    build_content_snippet, build_summary, derive_article, estimate_read_time, find_image_url,
    normalize_published_date, FEATURED_COUNT, SNIPPET_FALLBACK_WORD_LIMIT, SNIPPET_MAX_BLOCKS,
    SNIPPET_MAX_CHARS, SUMMARY_UNAVAILABLE, SUMMARY_WORD_LIMIT, WORDS_PER_MINUTE,
};
pub use document::{DocumentParser, HtmlDocumentParser, NullDocumentParser};
pub use extract::{decode_entities, extract_plain_text, strip_tags_fallback};
