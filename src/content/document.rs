use scraper::{ElementRef, Html, Node};

/// Subtrees whose content never reaches plain text or snippets.
pub(crate) const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "noscript", "svg"];

/// Elements whose boundaries separate words when markup is flattened.
pub(crate) const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Elements that make up a content snippet.
const SNIPPET_ELEMENTS: &[&str] = &["p", "ul", "ol", "h2", "h3", "h4", "blockquote", "pre"];

/// Structured HTML access used by content extraction.
///
/// Every method returns `None` when structured parsing is unavailable; the
/// caller then takes its pattern- or length-based fallback. Inputs are
/// already entity-decoded HTML fragments.
pub trait DocumentParser: Send + Sync {
    /// Text content of the fragment with skipped subtrees removed, images
    /// replaced by ` <alt> `, and a space at every block boundary.
    /// Whitespace is not yet collapsed.
    fn text_content(&self, html: &str) -> Option<String>;

    /// Serialized markup of the outermost snippet elements (`p`, lists,
    /// `h2`-`h4`, `blockquote`, `pre`) in document order.
    fn content_blocks(&self, html: &str) -> Option<Vec<String>>;
}

/// [`DocumentParser`] backed by `scraper`'s html5ever tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlDocumentParser;

impl DocumentParser for HtmlDocumentParser {
    fn text_content(&self, html: &str) -> Option<String> {
        let fragment = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        collect_text(fragment.root_element(), &mut out);
        Some(out)
    }

    fn content_blocks(&self, html: &str) -> Option<Vec<String>> {
        let fragment = Html::parse_fragment(html);
        let mut blocks = Vec::new();
        collect_blocks(fragment.root_element(), &mut blocks);
        Some(blocks)
    }
}

/// [`DocumentParser`] for environments without structured HTML parsing.
///
/// Always returns `None`, which routes every extraction step through its
/// fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDocumentParser;

impl DocumentParser for NullDocumentParser {
    fn text_content(&self, _html: &str) -> Option<String> {
        None
    }

    fn content_blocks(&self, _html: &str) -> Option<Vec<String>> {
        None
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if SKIPPED_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "img" {
                    if let Some(alt) = el.attr("alt").map(str::trim).filter(|a| !a.is_empty()) {
                        out.push(' ');
                        out.push_str(alt);
                        out.push(' ');
                    }
                    continue;
                }

                let is_block = BLOCK_ELEMENTS.contains(&name);
                if is_block {
                    out.push(' ');
                }
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
                if is_block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn collect_blocks(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    for child in element.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();
        if SNIPPET_ELEMENTS.contains(&name) {
            blocks.push(child.html());
        } else if !SKIPPED_ELEMENTS.contains(&name) {
            collect_blocks(child, blocks);
        }
    }
}
