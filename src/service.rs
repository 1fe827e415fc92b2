//! The feed ingestion service: fetch → parse → derive → cache → fallback.

use chrono::{SecondsFormat, Utc};
use std::sync::Arc;

use crate::cache::ArticleCache;
use crate::content::{derive_article, DocumentParser, HtmlDocumentParser};
use crate::feed::{parse_feed, FeedEndpoints, FetchError, HttpFetch};
use crate::types::{Article, ArticleBatch};
use crate::util::validate_owner_id;

/// Extra attempts after the first failed one
const MAX_RETRIES: u32 = 1;

/// Identifier of the placeholder article served when nothing else is available
pub const FALLBACK_ARTICLE_ID: &str = "medium-fallback";

/// Per-call options for [`FeedIngestionService::fetch_articles_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Attempts already spent by the caller. At 0 the service retries once
    /// after a failure; at 1 or more it does not retry at all.
    pub retry: u32,
}

/// Fetches a Medium feed through a CORS proxy and normalizes it into an
/// [`ArticleBatch`].
///
/// The cache is injected so whoever composes the service owns it; share the
/// same `Arc<ArticleCache>` between services to share the single slot.
pub struct FeedIngestionService<F, D = HtmlDocumentParser> {
    fetcher: F,
    documents: D,
    endpoints: FeedEndpoints,
    cache: Arc<ArticleCache>,
}

impl<F, D> FeedIngestionService<F, D>
where
    F: HttpFetch,
    D: DocumentParser,
{
    pub fn new(
        fetcher: F,
        documents: D,
        endpoints: FeedEndpoints,
        cache: Arc<ArticleCache>,
    ) -> Self {
        Self {
            fetcher,
            documents,
            endpoints,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<ArticleCache> {
        &self.cache
    }

    /// Returns the articles of `owner`'s feed.
    ///
    /// Never fails. Within the freshness window the cached batch is returned
    /// as the very same `Arc` (compare with [`Arc::ptr_eq`]). Otherwise the
    /// feed is fetched, retrying once on failure; if that also fails the
    /// last cached batch is returned whatever its age, and without one a
    /// single placeholder article (id [`FALLBACK_ARTICLE_ID`]).
    pub async fn fetch_articles(&self, owner: &str) -> Arc<ArticleBatch> {
        self.fetch_articles_with(owner, FetchOptions::default()).await
    }

    /// [`fetch_articles`](Self::fetch_articles) with explicit options.
    pub async fn fetch_articles_with(
        &self,
        owner: &str,
        options: FetchOptions,
    ) -> Arc<ArticleBatch> {
        if let Some(batch) = self.cache.get_fresh() {
            tracing::debug!(owner = %owner, "Serving articles from cache");
            return batch;
        }

        let handle = match validate_owner_id(owner) {
            Ok(handle) => handle,
            Err(e) => {
                // Deterministic failure: retrying cannot help
                tracing::warn!(owner = %owner, error = %e, "Refusing to fetch feed");
                return self.recover(owner, &FetchError::InvalidOwner(owner.to_string()));
            }
        };

        let attempts = if options.retry == 0 { 1 + MAX_RETRIES } else { 1 };
        let mut attempt = 0;

        let error = loop {
            attempt += 1;
            match self.fetch_once(handle).await {
                Ok(batch) => {
                    tracing::info!(
                        owner = %handle,
                        articles = batch.total_articles,
                        attempt = attempt,
                        "Fetched feed"
                    );
                    return self.cache.store(batch);
                }
                Err(e) => {
                    tracing::warn!(
                        owner = %handle,
                        attempt = attempt,
                        of = attempts,
                        error = %e,
                        "Feed fetch attempt failed"
                    );
                    if attempt >= attempts {
                        break e;
                    }
                }
            }
        };

        self.recover(handle, &error)
    }

    /// Empties the cache so the next fetch goes to the network.
    pub fn clear_cache(&self) {
        tracing::debug!("Clearing article cache");
        self.cache.clear();
    }

    async fn fetch_once(&self, handle: &str) -> Result<ArticleBatch, FetchError> {
        let url = self.endpoints.proxied_feed_url(handle);
        let response = self.fetcher.get(&url).await?;
        if !response.is_success() {
            return Err(FetchError::HttpStatus(response.status));
        }

        let items = parse_feed(&response.body)?;

        let now = Utc::now();
        let articles: Vec<Article> = items
            .iter()
            .enumerate()
            .map(|(index, item)| derive_article(item, index, &self.documents, now))
            .collect();

        Ok(ArticleBatch::new(
            articles,
            self.endpoints.profile_url(handle),
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        ))
    }

    /// Stale cache if there is one, placeholder batch otherwise.
    fn recover(&self, owner: &str, error: &FetchError) -> Arc<ArticleBatch> {
        if let Some(stale) = self.cache.get() {
            tracing::warn!(
                error = %error,
                age_secs = stale.age().as_secs(),
                "Serving stale cached articles"
            );
            return stale.batch;
        }

        tracing::warn!(error = %error, "No cached articles, serving placeholder");
        Arc::new(fallback_batch(&self.endpoints, owner))
    }
}

/// The single-article batch served when fetching fails and nothing is cached.
pub fn fallback_batch(endpoints: &FeedEndpoints, owner: &str) -> ArticleBatch {
    let profile_url = match validate_owner_id(owner) {
        Ok(handle) => endpoints.profile_url(handle),
        Err(_) => endpoints.profile_base_url.clone(),
    };
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    let article = Article {
        id: FALLBACK_ARTICLE_ID.to_string(),
        title: "Latest writing on Medium".to_string(),
        description: "Articles could not be loaded right now. Visit the Medium profile to \
                      read the latest posts."
            .to_string(),
        url: profile_url.clone(),
        published_date: now.clone(),
        read_time: "1 min read".to_string(),
        tags: vec!["medium".to_string()],
        featured: true,
        image_url: None,
        content_snippet: "<p>Articles could not be loaded right now.</p>".to_string(),
    };

    ArticleBatch::new(vec![article], profile_url, now)
}
