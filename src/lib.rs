//! # Topic Digest
//!
//! A news digest pipeline that collects articles about one topic from a
//! search API and a list of RSS/Atom feeds, summarizes each article and
//! scores its sentiment through a hosted inference API, and publishes the
//! result as a JSON file.
//!
//! ## Architecture
//!
//! The pipeline runs once per invocation:
//! 1. **Collection**: search source first, then each feed in order; failing
//!    sources are skipped ([`collector`])
//! 2. **Selection**: validation, URL deduplication, first `digest_size`
//!    articles kept ([`pipeline`])
//! 3. **Analysis**: summary and sentiment per article, all articles in
//!    flight at once, with local fallbacks ([`analyzer`])
//! 4. **Output**: the digest handed to a [`DigestStore`] ([`outputs`])
//!
//! Only a storage failure fails a run. Every network problem upstream of
//! storage degrades to fewer articles or fallback analysis.

pub mod analyzer;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod inference;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod sources;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use analyzer::Analyzer;
pub use collector::Collector;
pub use config::{AnalyzerConfig, CollectorConfig, DigestConfig};
pub use error::{DigestError, Result};
pub use inference::{HfInference, InferenceClient};
pub use models::{AnalyzedArticle, Article, RunReport, Sentiment};
pub use outputs::FileStore;
pub use pipeline::{DigestStore, build_digest, run_digest};
pub use sources::{FeedFetcher, GNewsSource, HttpFeedFetcher, SearchSource};
