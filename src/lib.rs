//! Medium feed ingestion for portfolio sites.
//!
//! Fetches an owner's Medium RSS feed through a CORS proxy, normalizes every
//! item into an [`Article`] and keeps the last good result in a single-slot
//! cache. [`FeedIngestionService::fetch_articles`] never fails: when the
//! network or the feed is broken it serves stale data or a placeholder.

pub mod cache;
pub mod config;
pub mod content;
pub mod feed;
pub mod service;
pub mod types;
pub mod util;

pub use cache::{ArticleCache, CachedResult};
pub use config::{Config, ConfigError};
pub use service::{fallback_batch, FeedIngestionService, FetchOptions, FALLBACK_ARTICLE_ID};
pub use types::{Article, ArticleBatch};
