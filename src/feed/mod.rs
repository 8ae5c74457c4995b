//! Concurrent RSS fetch-and-merge pipeline.
//!
//! - [`item`] - the normalized [`FeedItem`] every feed is mapped onto
//! - [`date`] - best-effort `pubDate` parsing across common layouts
//! - [`decoder`] - streaming RSS 2.0 decoding with per-document channel attribution
//! - [`fetcher`] - single-feed HTTP GET with timeout and size limit
//! - [`aggregator`] - bounded fan-out over a URL list and fan-in of the results
//!
//! # Example
//!
//! ```no_run
//! use feedmerge::config::Config;
//! use feedmerge::feed::Aggregator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let aggregator = Aggregator::new(&Config::default())?;
//! let items = aggregator
//!     .parse("https://example.com/a.xml,https://example.org/b.xml")
//!     .await;
//! println!("{} items", items.len());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod date;
pub mod decoder;
pub mod fetcher;
pub mod item;

pub use aggregator::{split_urls, AggregateReport, Aggregator, FeedError, FeedReport};
pub use date::parse_date;
pub use decoder::{decode, DecodeError, DecodedFeed};
pub use fetcher::{FetchError, Fetcher};
pub use item::FeedItem;
