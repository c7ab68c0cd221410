//! Data models for collected articles and their analyzed representations.
//!
//! - [`Article`]: a normalized article produced by the collector
//! - [`AnalyzedArticle`]: an article plus its summary and [`Sentiment`]
//! - [`RunReport`]: what a successful digest run produced
//!
//! Field names serialize in camelCase so the persisted digest keeps the
//! `publishedAt` key its consumers read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized news article.
///
/// Created once by the collector and never modified afterwards. Within one
/// collection run no two articles share the same `url`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Headline, trimmed.
    pub title: String,
    /// Canonical link; the identity key used for deduplication.
    pub url: String,
    /// Human-readable name of the outlet or feed.
    pub source: String,
    /// Publication timestamp as the source reported it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    /// Body text or snippet used as the analysis input.
    #[serde(default)]
    pub content: String,
}

impl Article {
    /// Whether the article may enter the merged collection.
    ///
    /// Title, url and content must be non-empty and the url must be an
    /// `http`/`https` link.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.content.trim().is_empty()
            && !self.url.is_empty()
            && self.url.starts_with("http")
    }
}

/// Categorical sentiment of an article summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }

    /// Map a classifier label to a sentiment.
    ///
    /// Accepts the positional labels of the three-class sentiment model as
    /// well as the textual labels newer revisions of it emit.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "LABEL_0" => Some(Sentiment::Negative),
            "LABEL_1" => Some(Sentiment::Neutral),
            "LABEL_2" => Some(Sentiment::Positive),
            other => match other.to_ascii_lowercase().as_str() {
                "negative" => Some(Sentiment::Negative),
                "neutral" => Some(Sentiment::Neutral),
                "positive" => Some(Sentiment::Positive),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An article after summarization and sentiment scoring.
///
/// This is the unit persisted in the digest. The article fields are
/// flattened so each digest entry is a single JSON object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalyzedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub summary: String,
    pub sentiment: Sentiment,
}

/// Outcome of a successful digest run.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunReport {
    pub message: String,
    /// Number of articles in the published digest.
    pub count: usize,
    /// Number of articles that survived collection and deduplication.
    pub collected: usize,
    /// RFC 3339 completion time.
    pub timestamp: String,
    pub duration_ms: u128,
}
