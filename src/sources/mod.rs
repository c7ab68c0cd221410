//! Article sources consumed by the collector.
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | GNews | [`gnews`] | JSON search API | Requires API key; skipped without one |
//! | RSS / Atom feeds | [`feed`] | XML feed parsing | Titles filtered by topic keyword |
//!
//! Each source kind sits behind a trait so the collector can be driven by
//! fixtures in tests. Source-specific item shapes never leave this module;
//! everything handed to the collector is already an [`Article`] or a parsed
//! [`Feed`](feed::Feed).

use crate::error::Result;
use crate::models::Article;

pub mod feed;
pub mod gnews;

pub use feed::{Feed, FeedEntry, HttpFeedFetcher};
pub use gnews::GNewsSource;

/// A structured search API returning topic-scoped articles.
pub trait SearchSource {
    /// Whether the source has the credential it needs.
    fn is_configured(&self) -> bool;

    /// Run the topic search and return normalized articles.
    ///
    /// Items missing a required field are dropped, not reported as errors.
    async fn search(&self) -> Result<Vec<Article>>;
}

/// Fetches and parses one syndication feed.
pub trait FeedFetcher {
    async fn fetch_feed(&self, url: &str) -> Result<Feed>;
}
