//! Per-item field derivation: turns a raw [`FeedItem`] into an [`Article`].

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use super::document::DocumentParser;
use super::extract::{decode_entities, extract_plain_text};
use crate::feed::FeedItem;
use crate::types::Article;
use crate::util::{truncate_chars, truncate_words, word_count, ELLIPSIS};

pub const SUMMARY_WORD_LIMIT: usize = 60;
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable";
pub const WORDS_PER_MINUTE: usize = 200;
/// Articles at positions below this are featured
pub const FEATURED_COUNT: usize = 3;

pub const SNIPPET_MAX_BLOCKS: usize = 3;
pub const SNIPPET_MAX_CHARS: usize = 900;
/// Word cap for the plain-text snippet used when no block elements exist
pub const SNIPPET_FALLBACK_WORD_LIMIT: usize = 180;

const UNTITLED: &str = "Untitled";

static IMG_SRC_RE: OnceLock<Regex> = OnceLock::new();

/// Builds the consumer-facing article for the item at `index` in the batch.
///
/// `now` stands in for a missing publication date.
pub fn derive_article(
    item: &FeedItem,
    index: usize,
    parser: &dyn DocumentParser,
    now: DateTime<Utc>,
) -> Article {
    let body_html = primary_html(item);

    let body_text = extract_plain_text(body_html, parser);
    let text = if body_text.is_empty() {
        extract_plain_text(&item.description, parser)
    } else {
        body_text
    };

    let title = item.title.trim();

    Article {
        id: article_id(item, index),
        title: (if title.is_empty() { UNTITLED } else { title }).to_string(),
        description: build_summary(&text),
        url: item.link.trim().to_string(),
        published_date: normalize_published_date(&item.pub_date, now),
        read_time: estimate_read_time(&text),
        tags: item.categories.clone(),
        featured: index < FEATURED_COUNT,
        image_url: find_image_url(&item.content_encoded)
            .or_else(|| find_image_url(&item.description)),
        content_snippet: build_content_snippet(body_html, parser),
    }
}

/// Encoded content when present, otherwise the description.
fn primary_html(item: &FeedItem) -> &str {
    if item.content_encoded.trim().is_empty() {
        &item.description
    } else {
        &item.content_encoded
    }
}

fn article_id(item: &FeedItem, index: usize) -> String {
    [item.guid.trim(), item.link.trim()]
        .into_iter()
        .find(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("article-{index}"))
}

/// Caps plain text at [`SUMMARY_WORD_LIMIT`] words, never returning an empty
/// string.
pub fn build_summary(text: &str) -> String {
    let summary = truncate_words(text, SUMMARY_WORD_LIMIT);
    if summary.is_empty() {
        SUMMARY_UNAVAILABLE.to_string()
    } else {
        summary
    }
}

/// "<N> min read" at [`WORDS_PER_MINUTE`], rounded up, at least 1 minute.
pub fn estimate_read_time(text: &str) -> String {
    let minutes = word_count(text).div_ceil(WORDS_PER_MINUTE).max(1);
    format!("{minutes} min read")
}

/// Bounded HTML excerpt of an item body.
///
/// Takes the outermost block elements in document order until
/// [`SNIPPET_MAX_BLOCKS`] are collected or [`SNIPPET_MAX_CHARS`] characters
/// are reached, appending an ellipsis in the latter case. Bodies without
/// block elements yield word-capped plain text instead. Without a document
/// parser the decoded markup is cut at [`SNIPPET_MAX_CHARS`].
pub fn build_content_snippet(html: &str, parser: &dyn DocumentParser) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let decoded = decode_entities(html);
    match parser.content_blocks(&decoded) {
        Some(blocks) => snippet_from_blocks(&blocks).unwrap_or_else(|| {
            truncate_words(
                &extract_plain_text(html, parser),
                SNIPPET_FALLBACK_WORD_LIMIT,
            )
        }),
        None => truncate_markup(&decoded, SNIPPET_MAX_CHARS),
    }
}

fn snippet_from_blocks(blocks: &[String]) -> Option<String> {
    let mut parts: Vec<&str> = Vec::with_capacity(SNIPPET_MAX_BLOCKS);
    let mut total_chars = 0;

    for block in blocks.iter().take(SNIPPET_MAX_BLOCKS) {
        parts.push(block);
        total_chars += block.chars().count();
        if total_chars >= SNIPPET_MAX_CHARS {
            break;
        }
    }

    if parts.is_empty() {
        return None;
    }

    let mut snippet = parts.concat();
    if total_chars >= SNIPPET_MAX_CHARS {
        snippet.push_str(ELLIPSIS);
    }
    Some(snippet)
}

/// Cuts markup at `max_chars` characters. A tag left open by the cut is
/// dropped, so the result is at most `max_chars` plus the ellipsis.
fn truncate_markup(html: &str, max_chars: usize) -> String {
    let mut cut = match truncate_chars(html, max_chars) {
        Cow::Borrowed(whole) => return whole.to_string(),
        Cow::Owned(cut) => cut,
    };

    if let Some(open) = cut.rfind('<') {
        if !cut[open..].contains('>') {
            cut.truncate(open);
        }
    }
    cut.push_str(ELLIPSIS);
    cut
}

/// Heuristic cover-image lookup: the `src` of the first `<img>` tag.
///
/// This is a pattern match over raw markup, not a parse. It is good enough
/// for picking a decorative thumbnail and nothing else should rely on it.
pub fn find_image_url(html: &str) -> Option<String> {
    let re = IMG_SRC_RE.get_or_init(|| {
        Regex::new(r#"(?is)<img\b[^>]*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("static regex pattern")
    });

    re.captures(html)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| decode_entities(m.as_str().trim()).into_owned())
        .filter(|src| !src.is_empty())
}

/// RFC 2822 (or RFC 3339) dates become RFC 3339 UTC with milliseconds.
///
/// A missing date becomes `now`; an unparseable one is kept as written.
pub fn normalize_published_date(raw: &str, now: DateTime<Utc>) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return now.to_rfc3339_opts(SecondsFormat::Millis, true);
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| {
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        })
        .unwrap_or_else(|_| {
            tracing::debug!(pub_date = %raw, "Keeping unparseable publication date");
            raw.to_string()
        })
}
