use serde::Serialize;

// ============================================================================
// Consumer-facing Types
// ============================================================================

/// A normalized article, ready for presentation.
///
/// Field names serialize in camelCase to match the JSON shape the
/// presentation layer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Unique within a batch: GUID, else link, else `article-<index>`
    pub id: String,
    /// Item title, "Untitled" when the feed omits it
    pub title: String,
    /// Plain-text summary capped at 60 words, never empty
    pub description: String,
    /// Canonical article URL (may be empty)
    pub url: String,
    /// RFC 3339 publication date
    pub published_date: String,
    /// "<N> min read" with N >= 1
    pub read_time: String,
    /// Category labels in feed order, duplicates kept
    pub tags: Vec<String>,
    /// True for the first three articles of a batch
    pub featured: bool,
    /// Cover image sniffed from the item markup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Bounded HTML excerpt of the article body (may be empty)
    pub content_snippet: String,
}

/// The result of one `fetch_articles` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBatch {
    pub articles: Vec<Article>,
    /// Public profile page of the feed owner
    pub profile_url: String,
    pub total_articles: usize,
    /// RFC 3339 timestamp of when the batch was assembled
    pub last_updated: String,
}

impl ArticleBatch {
    pub fn new(articles: Vec<Article>, profile_url: String, last_updated: String) -> Self {
        Self {
            total_articles: articles.len(),
            articles,
            profile_url,
            last_updated,
        }
    }
}
