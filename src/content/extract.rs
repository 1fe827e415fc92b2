use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

use super::document::DocumentParser;
use crate::util::collapse_whitespace;

static SKIPPED_SUBTREE_RE: OnceLock<Regex> = OnceLock::new();
static COMMENT_RE: OnceLock<Regex> = OnceLock::new();
static IMG_TAG_RE: OnceLock<Regex> = OnceLock::new();
static ALT_ATTR_RE: OnceLock<Regex> = OnceLock::new();
static BLOCK_TAG_RE: OnceLock<Regex> = OnceLock::new();
static ANY_TAG_RE: OnceLock<Regex> = OnceLock::new();

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex pattern"))
}

/// Decodes HTML character references (`&amp;`, `&#39;`, `&nbsp;`, ...).
pub fn decode_entities(html: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(html)
}

/// Flattens an HTML fragment to whitespace-collapsed plain text.
///
/// Entities are decoded first; `script`, `style`, `iframe`, `noscript` and
/// `svg` content is dropped; images become their alt text. When `parser`
/// cannot build a document, [`strip_tags_fallback`] produces the same text
/// for well-formed input.
///
/// Text that contains no markup comes back unchanged apart from whitespace
/// collapsing.
pub fn extract_plain_text(html: &str, parser: &dyn DocumentParser) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let decoded = decode_entities(html);
    let flattened = match parser.text_content(&decoded) {
        Some(text) => text,
        None => strip_tags_fallback(&decoded),
    };
    collapse_whitespace(&flattened)
}

/// Pattern-based markup removal for when no document parser is available.
///
/// Mirrors the structured path: excluded subtrees are removed with their
/// content, images become ` <alt> `, block tags become a space and every
/// other tag is deleted. Whitespace is left for the caller to collapse.
pub fn strip_tags_fallback(html: &str) -> String {
    let skipped = regex(
        &SKIPPED_SUBTREE_RE,
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<iframe\b[^>]*>.*?</iframe\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<svg\b[^>]*>.*?</svg\s*>|<(?:script|style|iframe|noscript|svg)\b[^>]*/>",
    );
    let comments = regex(&COMMENT_RE, r"(?s)<!--.*?-->");
    let images = regex(&IMG_TAG_RE, r"(?is)<img\b[^>]*>");
    let alt = regex(
        &ALT_ATTR_RE,
        r#"(?i)\salt\s*=\s*(?:"([^"]*)"|'([^']*)')"#,
    );
    let blocks = regex(
        &BLOCK_TAG_RE,
        r"(?i)</?(?:address|article|aside|blockquote|br|dd|div|dl|dt|figcaption|figure|footer|h[1-6]|header|hr|li|main|nav|ol|p|pre|section|table|td|th|tr|ul)\b[^>]*>",
    );
    let tags = regex(&ANY_TAG_RE, r"</?[a-zA-Z][^>]*>");

    let text = skipped.replace_all(html, "");
    let text = comments.replace_all(&text, "");
    let text = images.replace_all(&text, |caps: &Captures<'_>| {
        let alt_text = alt
            .captures(&caps[0])
            .and_then(|c| c.get(1).or_else(|| c.get(2)))
            .map(|m| m.as_str().trim())
            .unwrap_or("");
        if alt_text.is_empty() {
            String::new()
        } else {
            format!(" {alt_text} ")
        }
    });
    let text = blocks.replace_all(&text, " ");
    tags.replace_all(&text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::document::{HtmlDocumentParser, NullDocumentParser};
    use pretty_assertions::assert_eq;

    const MIXED: &str = "<h2>Heading</h2><p>Some <em>inline</em> text &amp; more.</p>\
        <script>alert('x')</script><p>Image: <img src=\"a.png\" alt=\"A chart\"/> done</p>\
        <!-- hidden --><style>.x{}</style><ul><li>one</li><li>two</li></ul>";

    #[test]
    fn test_structured_and_fallback_agree_on_well_formed_input() {
        let structured = extract_plain_text(MIXED, &HtmlDocumentParser);
        let fallback = extract_plain_text(MIXED, &NullDocumentParser);
        assert_eq!(structured, "Heading Some inline text & more. Image: A chart done one two");
        assert_eq!(fallback, structured);
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        let input = "Already plain text, with punctuation!";
        assert_eq!(extract_plain_text(input, &HtmlDocumentParser), input);
        assert_eq!(extract_plain_text(input, &NullDocumentParser), input);
    }

    #[test]
    fn test_plain_text_whitespace_is_collapsed() {
        assert_eq!(
            extract_plain_text("  spaced \n\n out  ", &HtmlDocumentParser),
            "spaced out"
        );
    }

    #[test]
    fn test_entity_encoded_markup_is_decoded_then_stripped() {
        let html = "&lt;p&gt;Encoded &lt;b&gt;markup&lt;/b&gt;&lt;/p&gt;";
        assert_eq!(extract_plain_text(html, &HtmlDocumentParser), "Encoded markup");
        assert_eq!(extract_plain_text(html, &NullDocumentParser), "Encoded markup");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(extract_plain_text("", &HtmlDocumentParser), "");
        assert_eq!(extract_plain_text("   ", &NullDocumentParser), "");
    }

    #[test]
    fn test_fallback_single_quoted_alt_and_self_closing_svg() {
        let html = "<p>a<img src='x' alt='Alt text'>b<svg/>c</p>";
        assert_eq!(collapse_whitespace(&strip_tags_fallback(html)), "a Alt text bc");
    }

    #[test]
    fn test_fallback_image_without_alt_removed() {
        assert_eq!(strip_tags_fallback("x<img src=\"a.png\">y"), "xy");
    }

    #[test]
    fn test_fallback_ignores_data_alt() {
        // only a real alt attribute counts
        assert_eq!(strip_tags_fallback("x<img data-alt=\"no\" src=\"a\">y"), "xy");
    }
}
