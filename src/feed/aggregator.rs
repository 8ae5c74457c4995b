use crate::config::Config;
use crate::feed::decoder::{decode, DecodeError, DecodedFeed};
use crate::feed::fetcher::{FetchError, Fetcher};
use crate::feed::item::FeedItem;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// Why a single feed contributed nothing to the merged result.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The HTTP request failed or returned a non-200 status
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The body was not a well-formed feed document
    #[error("Parse error: {0}")]
    Decode(#[from] DecodeError),
    /// The worker task panicked or was cancelled
    #[error("Fetch task failed: {0}")]
    Task(String),
}

/// Outcome for one URL of the input list.
#[derive(Debug)]
pub struct FeedReport {
    /// The URL exactly as it was taken from the input list
    pub url: String,
    /// Number of items merged from this feed, or the error that dropped it
    pub result: Result<usize, FeedError>,
}

/// Merged items plus a per-feed account of what happened.
///
/// Both vectors are in completion order, not input order.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub items: Vec<FeedItem>,
    pub feeds: Vec<FeedReport>,
}

impl AggregateReport {
    /// Feeds that failed to fetch or decode.
    pub fn failures(&self) -> impl Iterator<Item = &FeedReport> {
        self.feeds.iter().filter(|f| f.result.is_err())
    }
}

/// Splits a delimited URL list into entries, trimming whitespace around each.
///
/// Empty entries are kept: `""` yields one empty URL and `"a,,b"` yields
/// three entries. An empty delimiter treats the whole list as one URL.
pub fn split_urls<'a>(list: &'a str, delimiter: &str) -> Vec<&'a str> {
    if delimiter.is_empty() {
        return vec![list.trim()];
    }
    list.split(delimiter).map(str::trim).collect()
}

/// Fans out one fetch-and-decode per URL and merges whatever succeeds.
///
/// At most `max_concurrent_fetches` feeds are in flight at once. Each feed
/// runs on its own tokio task, so decoding proceeds in parallel on a
/// multi-threaded runtime.
#[derive(Debug, Clone)]
pub struct Aggregator {
    fetcher: Fetcher,
    delimiter: String,
    concurrency: usize,
}

impl Aggregator {
    /// Builds an aggregator with its own HTTP client.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::with_fetcher(Fetcher::new(config)?, config))
    }

    pub fn with_fetcher(fetcher: Fetcher, config: &Config) -> Self {
        Self {
            fetcher,
            delimiter: config.delimiter.clone(),
            concurrency: config.concurrency(),
        }
    }

    /// Fetches every feed in `url_list` and returns all items merged.
    ///
    /// Never fails: a feed that cannot be fetched or decoded contributes
    /// zero items and is logged at `warn`. Use [`parse_with_report`] to see
    /// which feeds failed.
    ///
    /// Items from one feed keep their document order; feeds are merged in
    /// the order they complete. Duplicates across feeds are kept.
    ///
    /// [`parse_with_report`]: Aggregator::parse_with_report
    pub async fn parse(&self, url_list: &str) -> Vec<FeedItem> {
        self.parse_with_report(url_list).await.items
    }

    /// Same as [`parse`](Aggregator::parse), serialized as a JSON array.
    pub async fn parse_json(&self, url_list: &str) -> serde_json::Result<String> {
        let items = self.parse(url_list).await;
        serde_json::to_string(&items)
    }

    /// Fetches every feed and reports the outcome of each one.
    pub async fn parse_with_report(&self, url_list: &str) -> AggregateReport {
        self.run(url_list, None).await
    }

    /// Like [`parse_with_report`](Aggregator::parse_with_report), sending
    /// `(completed, total)` on `progress_tx` as each feed finishes.
    ///
    /// Updates are sent without waiting. When the channel is full or the
    /// receiver is gone the update is dropped and the batch carries on, so
    /// the call returns even if nobody reads `progress_tx` until afterwards.
    pub async fn parse_with_progress(
        &self,
        url_list: &str,
        progress_tx: mpsc::Sender<(usize, usize)>,
    ) -> AggregateReport {
        self.run(url_list, Some(progress_tx)).await
    }

    /// Fetches and decodes a single feed, keeping the channel metadata.
    ///
    /// Unlike the batch calls this surfaces the feed's error directly.
    pub async fn fetch_feed(&self, url: &str) -> Result<DecodedFeed, FeedError> {
        fetch_and_decode(&self.fetcher, url).await
    }

    async fn run(
        &self,
        url_list: &str,
        progress_tx: Option<mpsc::Sender<(usize, usize)>>,
    ) -> AggregateReport {
        let urls: Vec<String> = split_urls(url_list, &self.delimiter)
            .into_iter()
            .map(str::to_owned)
            .collect();
        let total = urls.len();
        let completed = Arc::new(AtomicUsize::new(0));

        tracing::debug!(
            feeds = total,
            concurrency = self.concurrency,
            "Fetching feeds"
        );

        let outcomes: Vec<(String, Result<Vec<FeedItem>, FeedError>)> = stream::iter(urls)
            .map(|url| {
                let fetcher = self.fetcher.clone();
                let progress_tx = progress_tx.clone();
                let completed = completed.clone();

                async move {
                    // Spawned lazily, so buffer_unordered bounds the live tasks too
                    let task_url = url.clone();
                    let handle = tokio::spawn(async move {
                        fetch_and_decode(&fetcher, &task_url)
                            .await
                            .map(|feed| feed.items)
                    });
                    let result = match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(FeedError::Task(e.to_string())),
                    };

                    let done = completed.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                    // Never wait on the caller: a full or closed channel only loses an update
                    if let Some(tx) = progress_tx {
                        if let Err(e) = tx.try_send((done, total)) {
                            tracing::debug!(error = %e, done = done, total = total, "Progress update dropped");
                        }
                    }

                    (url, result)
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = AggregateReport::default();
        for (url, result) in outcomes {
            let result = match result {
                Ok(items) => {
                    let count = items.len();
                    report.items.extend(items);
                    Ok(count)
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Feed skipped");
                    Err(e)
                }
            };
            report.feeds.push(FeedReport { url, result });
        }

        tracing::info!(
            feeds = total,
            failed = report.failures().count(),
            items = report.items.len(),
            "Feeds merged"
        );

        report
    }
}

async fn fetch_and_decode(fetcher: &Fetcher, url: &str) -> Result<DecodedFeed, FeedError> {
    let bytes = fetcher.fetch(url).await?;
    let feed = decode(&bytes)?;
    tracing::debug!(
        url = %url,
        channel = %feed.title,
        items = feed.items.len(),
        "Decoded feed"
    );
    Ok(feed)
}
