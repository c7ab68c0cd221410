//! Article collection from the search source and the configured feeds.
//!
//! Sources are visited sequentially: the search source first, then every
//! feed in the order it appears in [`CollectorConfig::feed_urls`]. A source
//! that is unconfigured or fails is logged and skipped; it never prevents
//! the remaining sources from contributing. The merged sequence then goes
//! through a final validation and URL deduplication pass.

use crate::config::CollectorConfig;
use crate::models::Article;
use crate::sources::{FeedFetcher, SearchSource};
use itertools::Itertools;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Gathers articles from one [`SearchSource`] and many feeds.
#[derive(Debug)]
pub struct Collector<S, F> {
    config: CollectorConfig,
    search: S,
    feeds: F,
}

impl<S: SearchSource, F: FeedFetcher> Collector<S, F> {
    pub fn new(config: CollectorConfig, search: S, feeds: F) -> Self {
        Self {
            config,
            search,
            feeds,
        }
    }

    /// Collect, validate and deduplicate articles from every source.
    ///
    /// Never fails as a whole; the result is in encounter order.
    #[instrument(level = "info", skip_all)]
    pub async fn collect(&self) -> Vec<Article> {
        let t0 = Instant::now();
        let mut articles = self.collect_search().await;
        let search_count = articles.len();

        for url in &self.config.feed_urls {
            articles.extend(self.collect_feed(url).await);
        }
        let raw_count = articles.len();

        let unique = merge_and_dedupe(articles);
        info!(
            search = search_count,
            feeds = raw_count - search_count,
            unique = unique.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Collected articles"
        );
        unique
    }

    async fn collect_search(&self) -> Vec<Article> {
        if !self.search.is_configured() {
            warn!("Search API key not set; skipping search source");
            return Vec::new();
        }
        match self.search.search().await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(error = %e, "Search source failed; skipping");
                Vec::new()
            }
        }
    }

    async fn collect_feed(&self, url: &str) -> Vec<Article> {
        match self.feeds.fetch_feed(url).await {
            Ok(feed) => {
                let articles =
                    feed.accepted_articles(&self.config.topic_keyword, self.config.per_feed_limit);
                debug!(
                    %url,
                    entries = feed.entries.len(),
                    accepted = articles.len(),
                    "Filtered feed entries"
                );
                articles
            }
            Err(e) => {
                warn!(%url, error = %e, "Failed to fetch feed; skipping");
                Vec::new()
            }
        }
    }
}

/// Drop invalid articles, then keep only the first article seen for each url.
pub fn merge_and_dedupe(articles: Vec<Article>) -> Vec<Article> {
    let before = articles.len();
    let unique: Vec<Article> = articles
        .into_iter()
        .filter(Article::is_valid)
        .unique_by(|a| a.url.clone())
        .collect();
    if unique.len() < before {
        debug!(dropped = before - unique.len(), "Dropped invalid or duplicate articles");
    }
    unique
}
