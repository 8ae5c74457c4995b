use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use super::date::parse_date;
use super::item::FeedItem;

/// Maximum element nesting accepted in a feed document.
/// Deeply nested input is rejected instead of growing the path stack without bound.
const MAX_DEPTH: usize = 64;

/// Document-level failures. Field-level problems never surface here.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The XML tokenizer rejected the input.
    #[error("XML parse error at byte {position}: {message}")]
    Xml { position: u64, message: String },

    /// Input ended while elements were still open.
    #[error("unexpected end of document inside <{0}>")]
    Unclosed(String),

    /// Input contained no element at all (empty or text-only body).
    #[error("document has no root element")]
    NoRootElement,

    /// Nesting depth exceeds the safety limit.
    #[error("nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// The result of decoding one feed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFeed {
    /// Channel `<title>`
    pub title: String,
    /// Channel `<link>`
    pub link: String,
    /// Items in document order, each attributed to this channel
    pub items: Vec<FeedItem>,
}

/// Decodes an RSS 2.0 document into its channel metadata and items.
///
/// Expects `<rss><channel><title/><link/><item>...</item></channel></rss>`;
/// the root element's name is not checked. Channel title and link are read
/// from direct children of `<channel>` only, item fields (`title`, `link`,
/// `pubDate`, `description`) from direct children of `<item>` only. Names
/// match case-sensitively and in full, so `atom:link` is not `link`.
///
/// Attribution is applied after the whole document has been read, so a
/// channel `<title>` that follows its items still reaches every item.
///
/// # Errors
///
/// Returns [`DecodeError`] if the document is not well-formed XML, ends with
/// open elements, contains no element, or nests deeper than 64 levels.
/// An unparseable `pubDate` or an unknown entity only affects that field.
pub fn decode(raw: &[u8]) -> Result<DecodedFeed, DecodeError> {
    // quick-xml (0.37) never expands <!ENTITY> declarations, only the five
    // predefined entities and character references.
    let mut reader = Reader::from_reader(raw);
    let mut buf = Vec::new();
    let mut ctx = DecodeContext::default();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| DecodeError::Xml {
            position: reader.error_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(e) => ctx.open(e.name().as_ref())?,
            Event::Empty(e) => {
                ctx.open(e.name().as_ref())?;
                ctx.close();
            }
            Event::End(_) => ctx.close(),
            Event::Text(e) => {
                if ctx.capturing() {
                    match e.unescape() {
                        Ok(text) => ctx.text.push_str(&text),
                        Err(err) => {
                            tracing::debug!(error = %err, "Keeping raw text after unescape failure");
                            ctx.text.push_str(&String::from_utf8_lossy(&e));
                        }
                    }
                }
            }
            Event::CData(e) => {
                if ctx.capturing() {
                    ctx.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    ctx.finish()
}

/// Decode state for exactly one document. Never shared between decodes.
#[derive(Default)]
struct DecodeContext {
    /// Names of the currently open elements, outermost first
    path: Vec<Vec<u8>>,
    /// Text collected for the innermost channel or item field
    text: String,
    channel_title: String,
    channel_link: String,
    current: Option<FeedItem>,
    items: Vec<FeedItem>,
    saw_root: bool,
}

impl DecodeContext {
    /// Top of the path is `<channel>` directly under the root.
    fn in_channel(&self) -> bool {
        self.path.len() == 2 && self.path[1] == b"channel"
    }

    /// Top of the path is an `<item>` directly under the channel.
    fn in_item(&self) -> bool {
        self.path.len() == 3 && self.path[1] == b"channel" && self.path[2] == b"item"
    }

    /// Text only matters from channel children downwards.
    fn capturing(&self) -> bool {
        self.path.len() >= 3
    }

    fn open(&mut self, name: &[u8]) -> Result<(), DecodeError> {
        if self.path.len() >= MAX_DEPTH {
            return Err(DecodeError::MaxDepthExceeded(MAX_DEPTH));
        }
        self.saw_root = true;

        // A new channel or item field starts a fresh text buffer; markup nested
        // deeper (e.g. stray HTML in a description) keeps appending to it.
        if self.in_channel() || self.in_item() {
            self.text.clear();
            if name == b"item" && self.in_channel() {
                self.current = Some(FeedItem::default());
            }
        }

        self.path.push(name.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        let Some(name) = self.path.pop() else {
            return;
        };

        if self.in_item() {
            let value = self.take_text();
            if let Some(item) = self.current.as_mut() {
                match name.as_slice() {
                    b"title" => item.title = value,
                    b"link" => item.link = value,
                    b"description" => item.description = value,
                    b"pubDate" => {
                        item.publish_date = parse_date(&value);
                        if item.publish_date.is_none() && !value.is_empty() {
                            tracing::debug!(date = %value, "Unrecognized pubDate, leaving unset");
                        }
                    }
                    _ => {}
                }
            }
        } else if self.in_channel() {
            match name.as_slice() {
                b"item" => {
                    if let Some(item) = self.current.take() {
                        self.items.push(item);
                    }
                }
                b"title" => self.channel_title = self.take_text(),
                b"link" => self.channel_link = self.take_text(),
                _ => {}
            }
            self.text.clear();
        }
    }

    fn take_text(&mut self) -> String {
        let value = self.text.trim().to_owned();
        self.text.clear();
        value
    }

    fn finish(self) -> Result<DecodedFeed, DecodeError> {
        if let Some(open) = self.path.last() {
            return Err(DecodeError::Unclosed(
                String::from_utf8_lossy(open).into_owned(),
            ));
        }
        if !self.saw_root {
            return Err(DecodeError::NoRootElement);
        }

        let mut items = self.items;
        for item in &mut items {
            item.attribute(&self.channel_title, &self.channel_link);
        }

        Ok(DecodedFeed {
            title: self.channel_title,
            link: self.channel_link,
            items,
        })
    }
}
