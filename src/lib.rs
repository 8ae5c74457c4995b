//! Fetch many RSS feeds concurrently and merge their items into one list.
//!
//! The entry point is [`feed::Aggregator`]: give it a comma-separated list of
//! feed URLs and it returns every item from every feed that could be fetched
//! and decoded, each tagged with the title and link of the channel it came from.

pub mod config;
pub mod feed;
