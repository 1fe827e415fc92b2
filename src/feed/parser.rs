use quick_xml::events::{BytesText, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors produced while turning a feed body into [`FeedItem`]s.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not well-formed XML
    #[error("Malformed feed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Well-formed XML, but no `<rss>` or `<channel>` element anywhere
    #[error("Document is not an RSS feed")]
    NotAFeed,
    /// The body ended while elements were still open
    #[error("Feed XML ends with {0} unclosed element(s)")]
    Truncated(usize),
}

/// One `<item>` as it appears in the feed, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub pub_date: String,
    /// Raw HTML from `<description>`
    pub description: String,
    /// Raw HTML from `<content:encoded>`
    pub content_encoded: String,
    /// `<category>` labels, trimmed, in document order
    pub categories: Vec<String>,
    /// `<guid>`, or the link when the feed has no guid
    pub guid: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
    PubDate,
    Description,
    /// `qualified` is true for the literal `content:encoded` name
    Encoded { qualified: bool },
    Category,
    Guid,
}

impl Field {
    fn from_name(name: &[u8]) -> Option<Self> {
        let field = match name {
            b"title" => Field::Title,
            b"link" => Field::Link,
            b"pubDate" => Field::PubDate,
            b"description" => Field::Description,
            b"content:encoded" => Field::Encoded { qualified: true },
            b"category" => Field::Category,
            b"guid" => Field::Guid,
            other if local_name(other) == b"encoded" => Field::Encoded { qualified: false },
            _ => return None,
        };
        Some(field)
    }
}

/// In-progress item plus bookkeeping that does not belong on [`FeedItem`].
#[derive(Default)]
struct ItemBuilder {
    item: FeedItem,
    has_qualified_encoded: bool,
}

impl ItemBuilder {
    fn set(&mut self, field: Field, value: &str) {
        let value = value.trim();
        match field {
            Field::Title => self.item.title = value.to_string(),
            Field::Link => self.item.link = value.to_string(),
            Field::PubDate => self.item.pub_date = value.to_string(),
            Field::Description => self.item.description = value.to_string(),
            Field::Encoded { qualified: true } => {
                self.item.content_encoded = value.to_string();
                self.has_qualified_encoded = true;
            }
            // Only used when the explicit content:encoded element is absent
            Field::Encoded { qualified: false } => {
                if !self.has_qualified_encoded {
                    self.item.content_encoded = value.to_string();
                }
            }
            Field::Category => {
                if !value.is_empty() {
                    self.item.categories.push(value.to_string());
                }
            }
            Field::Guid => self.item.guid = value.to_string(),
        }
    }

    fn finish(self) -> FeedItem {
        let mut item = self.item;
        if item.guid.is_empty() {
            item.guid = item.link.clone();
        }
        item
    }
}

/// Parses an RSS document into its items, in document order.
///
/// Text and CDATA content are both accepted for every field. Channel-level
/// elements (the channel's own `<title>`, `<link>`, ...) are ignored.
///
/// # Errors
///
/// - [`ParseError::Xml`] for malformed XML (mismatched end tags, bad syntax)
/// - [`ParseError::NotAFeed`] when the document has no `<rss>`/`<channel>`
/// - [`ParseError::Truncated`] when the body stops before its root closes
///
/// A feed with zero items is not an error.
pub fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, ParseError> {
    let mut reader = Reader::from_str(xml);

    let mut items = Vec::new();
    let mut saw_feed_root = false;
    let mut current: Option<ItemBuilder> = None;
    // Field being captured and the exact tag name that opened it
    let mut field: Option<(Field, Vec<u8>)> = None;
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = e.name();
                let name = name.as_ref();
                if is_feed_root(name) {
                    saw_feed_root = true;
                }
                if name == b"item" {
                    current = Some(ItemBuilder::default());
                    field = None;
                } else if current.is_some() && field.is_none() {
                    if let Some(f) = Field::from_name(name) {
                        field = Some((f, name.to_vec()));
                        text.clear();
                    }
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                if is_feed_root(name.as_ref()) {
                    saw_feed_root = true;
                }
                if name.as_ref() == b"item" {
                    items.push(ItemBuilder::default().finish());
                }
            }
            Event::Text(e) => {
                if field.is_some() {
                    text.push_str(&unescape_lossy(&e));
                }
            }
            Event::CData(e) => {
                if field.is_some() {
                    text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let name = e.name();
                let name = name.as_ref();
                if name == b"item" {
                    if let Some(builder) = current.take() {
                        items.push(builder.finish());
                    }
                    field = None;
                } else if field
                    .as_ref()
                    .is_some_and(|(_, opened)| opened.as_slice() == name)
                {
                    if let (Some((f, _)), Some(builder)) = (field.take(), current.as_mut()) {
                        builder.set(f, &text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_feed_root {
        return Err(ParseError::NotAFeed);
    }
    // quick-xml reports EOF without checking for open elements
    if depth > 0 {
        return Err(ParseError::Truncated(depth));
    }

    Ok(items)
}

fn is_feed_root(name: &[u8]) -> bool {
    name == b"rss" || name == b"channel"
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|&b| b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// Unescapes XML text. Text using entities the XML reader does not know
/// (e.g. HTML's `&nbsp;` in unwrapped titles) is decoded as HTML instead.
fn unescape_lossy(e: &BytesText<'_>) -> String {
    match e.unescape() {
        Ok(text) => text.into_owned(),
        Err(err) => {
            tracing::trace!(error = %err, "Decoding feed text with HTML entities");
            html_escape::decode_html_entities(&String::from_utf8_lossy(e)).into_owned()
        }
    }
}
