//! One digest run: collect, select, analyze, persist.
//!
//! Collection and analysis recover from their own failures, so the only
//! way a run fails is the store refusing the digest. In that case nothing
//! is reported as published.

use crate::analyzer::Analyzer;
use crate::collector::Collector;
use crate::error::Result;
use crate::inference::InferenceClient;
use crate::models::{AnalyzedArticle, RunReport};
use crate::sources::{FeedFetcher, SearchSource};
use chrono::{SecondsFormat, Utc};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Destination for a finished digest.
pub trait DigestStore {
    /// Store the digest as a whole, replacing any previous one.
    async fn persist(&self, digest: &[AnalyzedArticle]) -> Result<()>;
}

/// Collect articles and analyze the first `digest_size` of them.
///
/// Returns the digest together with the number of articles collected.
#[instrument(level = "info", skip_all, fields(digest_size = digest_size))]
pub async fn build_digest<S, F, C>(
    collector: &Collector<S, F>,
    analyzer: &Analyzer<C>,
    digest_size: usize,
) -> (Vec<AnalyzedArticle>, usize)
where
    S: SearchSource,
    F: FeedFetcher,
    C: InferenceClient,
{
    let articles = collector.collect().await;
    let collected = articles.len();
    let selected = &articles[..collected.min(digest_size)];
    info!(collected, selected = selected.len(), "Selected articles for digest");

    (analyzer.analyze_batch(selected).await, collected)
}

/// Build a digest, hand it to `store`, and report on the run.
#[instrument(level = "info", skip_all, fields(digest_size = digest_size))]
pub async fn run_digest<S, F, C, D>(
    collector: &Collector<S, F>,
    analyzer: &Analyzer<C>,
    store: &D,
    digest_size: usize,
) -> Result<RunReport>
where
    S: SearchSource,
    F: FeedFetcher,
    C: InferenceClient,
    D: DigestStore,
{
    let t0 = Instant::now();
    let (digest, collected) = build_digest(collector, analyzer, digest_size).await;

    if let Err(e) = store.persist(&digest).await {
        error!(error = %e, count = digest.len(), "Failed to persist digest");
        return Err(e);
    }

    let report = RunReport {
        message: "News digest updated".to_string(),
        count: digest.len(),
        collected,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        duration_ms: t0.elapsed().as_millis(),
    };
    info!(
        count = report.count,
        collected = report.collected,
        elapsed_ms = report.duration_ms,
        "Digest published"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyzerConfig, CollectorConfig};
    use crate::models::Sentiment;
    use crate::test_support::{FakeFeeds, FakeInference, FakeSearch, MemoryStore, article};

    fn collector(count: usize) -> Collector<FakeSearch, FakeFeeds> {
        let articles = (0..count)
            .map(|i| article(&format!("Trump story {}", i), &format!("https://news.test/{}", i)))
            .collect();
        let config = CollectorConfig {
            feed_urls: Vec::new(),
            ..CollectorConfig::default()
        };
        Collector::new(config, FakeSearch::returning(articles), FakeFeeds::new())
    }

    fn analyzer() -> Analyzer<FakeInference> {
        Analyzer::new(FakeInference::unconfigured(), AnalyzerConfig::default())
    }

    #[tokio::test]
    async fn test_digest_takes_first_articles_in_order() {
        let (digest, collected) = build_digest(&collector(8), &analyzer(), 5).await;

        assert_eq!(collected, 8);
        let urls: Vec<&str> = digest.iter().map(|a| a.article.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://news.test/0",
                "https://news.test/1",
                "https://news.test/2",
                "https://news.test/3",
                "https://news.test/4",
            ]
        );
        assert!(digest.iter().all(|a| a.sentiment == Sentiment::Neutral));
    }

    #[tokio::test]
    async fn test_short_collection_yields_short_digest() {
        let (digest, collected) = build_digest(&collector(2), &analyzer(), 5).await;
        assert_eq!(collected, 2);
        assert_eq!(digest.len(), 2);
    }

    #[tokio::test]
    async fn test_run_persists_and_reports() {
        let store = MemoryStore::default();
        let report = run_digest(&collector(7), &analyzer(), &store, 5).await.unwrap();

        let persisted = store.persisted();
        assert_eq!(persisted.len(), 1);
        assert_eq!(report.count, persisted[0].len());
        assert_eq!(report.count, 5);
        assert_eq!(report.collected, 7);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_empty_run_still_persists() {
        let store = MemoryStore::default();
        let report = run_digest(&collector(0), &analyzer(), &store, 5).await.unwrap();

        assert_eq!(report.count, 0);
        assert_eq!(store.persisted(), vec![Vec::<AnalyzedArticle>::new()]);
    }

    #[tokio::test]
    async fn test_store_failure_is_an_error() {
        let store = MemoryStore::failing();
        let result = run_digest(&collector(3), &analyzer(), &store, 5).await;
        assert!(result.is_err());
    }
}
