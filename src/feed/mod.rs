//! Feed retrieval: endpoints, HTTP fetching and RSS parsing.
//!
//! - [`endpoints`] - Feed, profile and CORS-proxy URL construction
//! - [`fetcher`] - The [`HttpFetch`] capability and its `reqwest` implementation
//! - [`parser`] - `quick-xml` pull parser producing raw [`FeedItem`]s
//!
//! Nothing here normalizes content; see [`crate::content`] for that.

mod endpoints;
mod fetcher;
mod parser;

pub use endpoints::{
    FeedEndpoints, DEFAULT_FEED_BASE_URL, DEFAULT_PROFILE_BASE_URL, DEFAULT_PROXY_URL,
};
pub use fetcher::{
    FetchError, HttpFetch, HttpResponse, ReqwestFetcher, DEFAULT_MAX_FEED_SIZE, DEFAULT_TIMEOUT,
};
pub use parser::{parse_feed, FeedItem, ParseError};
