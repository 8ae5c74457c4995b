use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry from a feed, normalized across sources.
///
/// `source` and `source_url` come from the owning channel, not from the
/// `<item>` element itself. The decoder fills them in once the whole
/// document has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    /// Channel title of the feed this item was read from
    pub source: String,
    /// Channel link of the feed this item was read from
    pub source_url: String,
    pub link: String,
    /// `None` when the feed omitted the date or it could not be parsed
    pub publish_date: Option<DateTime<Utc>>,
    pub description: String,
}

impl FeedItem {
    /// Stamps channel attribution onto the item.
    pub(crate) fn attribute(&mut self, source: &str, source_url: &str) {
        self.source = source.to_owned();
        self.source_url = source_url.to_owned();
    }
}
