//! Run configuration.
//!
//! Everything the collector and analyzer need is carried in explicit
//! structs rather than module-level constants, so tests can point the
//! pipeline at fixtures. The defaults reproduce the production setup and a
//! YAML file may override any subset of them:
//!
//! ```yaml
//! digest_size: 5
//! collector:
//!   per_feed_limit: 10
//!   feed_urls:
//!     - https://feeds.bbci.co.uk/news/politics/rss.xml
//! analyzer:
//!   request_timeout_ms: 5000
//! ```

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Top-level configuration for a digest run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Number of collected articles that get analyzed and published.
    pub digest_size: usize,
    pub collector: CollectorConfig,
    pub analyzer: AnalyzerConfig,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            digest_size: 5,
            collector: CollectorConfig::default(),
            analyzer: AnalyzerConfig::default(),
        }
    }
}

impl DigestConfig {
    /// Parse a configuration from YAML text; missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration file from disk.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = tokio::fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            feeds = config.collector.feed_urls.len(),
            digest_size = config.digest_size,
            "Loaded configuration"
        );
        Ok(config)
    }
}

/// Sources and limits used by the [`Collector`](crate::collector::Collector).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Structured search endpoint (GNews v4 search).
    pub search_endpoint: String,
    /// Query sent to the search endpoint.
    pub search_query: String,
    pub search_language: String,
    /// Upper bound on search results requested.
    pub search_result_limit: usize,
    /// Case-sensitive term a feed entry title must contain.
    pub topic_keyword: String,
    /// Feed endpoints, fetched in this order.
    pub feed_urls: Vec<String>,
    /// Maximum number of leading entries considered per feed.
    pub per_feed_limit: usize,
    /// Per-request bound for the search call and each feed fetch.
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            search_endpoint: "https://gnews.io/api/v4/search".to_string(),
            search_query: "\"Donald Trump\"".to_string(),
            search_language: "en".to_string(),
            search_result_limit: 10,
            topic_keyword: "Trump".to_string(),
            feed_urls: vec![
                "https://www.npr.org/rss/rss.php?id=1014".to_string(),
                "https://feeds.bbci.co.uk/news/politics/rss.xml".to_string(),
                "https://feeds.feedburner.com/realclearpolitics/qlMj".to_string(),
            ],
            per_feed_limit: 15,
            request_timeout_secs: 15,
            user_agent: "Mozilla/5.0 (compatible; RSSReader/1.0)".to_string(),
        }
    }
}

impl CollectorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Inference endpoints and limits used by the [`Analyzer`](crate::analyzer::Analyzer).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Base URL; the model name is appended as a path segment.
    pub inference_endpoint: String,
    pub summarization_model: String,
    pub sentiment_model: String,
    /// Content is clipped to this many characters before any call.
    pub max_content_length: usize,
    /// Length of the local fallback summary, before the ellipsis.
    pub fallback_summary_length: usize,
    /// Bound on each inference call; stored in milliseconds so tests can
    /// use sub-second values.
    pub request_timeout_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            inference_endpoint: "https://api-inference.huggingface.co/models".to_string(),
            summarization_model: "facebook/bart-large-cnn".to_string(),
            sentiment_model: "cardiffnlp/twitter-roberta-base-sentiment".to_string(),
            max_content_length: 5000,
            fallback_summary_length: 200,
            request_timeout_ms: 10_000,
        }
    }
}

impl AnalyzerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
