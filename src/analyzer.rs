//! Article analysis: summary and sentiment.
//!
//! Every article goes through the same steps:
//!
//! 1. Input guard: unusable content short-circuits to a placeholder summary
//!    and [`Sentiment::Neutral`] without touching the network
//! 2. Content is clipped to `max_content_length` characters
//! 3. Summarization call; on any failure the summary is the first
//!    `fallback_summary_length` characters of the clipped content
//! 4. Sentiment call on the summary; the top label is mapped to a
//!    [`Sentiment`], anything unexpected becomes neutral
//!
//! Each external call is bounded by `request_timeout` and never retried.
//! Analysis cannot fail; every failure resolves to a fallback value.

use crate::config::AnalyzerConfig;
use crate::inference::{InferenceClient, parse_label_scores, parse_summary, top_label};
use crate::models::{AnalyzedArticle, Article, Sentiment};
use crate::utils::{truncate_chars, truncate_for_log};
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

/// Summary used when an article has no usable content.
pub const NO_CONTENT_PLACEHOLDER: &str = "No content available";

const ELLIPSIS: &str = "...";

/// Produces [`AnalyzedArticle`]s through an [`InferenceClient`].
///
/// Holds no per-article state, so any number of analyses may run at once.
#[derive(Debug)]
pub struct Analyzer<C> {
    client: C,
    config: AnalyzerConfig,
}

impl<C: InferenceClient> Analyzer<C> {
    pub fn new(client: C, config: AnalyzerConfig) -> Self {
        Self { client, config }
    }

    /// Analyze a single article.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub async fn analyze(&self, article: &Article) -> AnalyzedArticle {
        if article.content.trim().is_empty() {
            debug!("Article has no content; skipping inference");
            return AnalyzedArticle {
                article: article.clone(),
                summary: NO_CONTENT_PLACEHOLDER.to_string(),
                sentiment: Sentiment::Neutral,
            };
        }

        let content = truncate_chars(&article.content, self.config.max_content_length);

        let summary = match self.summarize(content).await {
            Some(summary) => summary,
            None => fallback_summary(content, self.config.fallback_summary_length),
        };
        let sentiment = self.classify(&summary).await.unwrap_or_default();

        AnalyzedArticle {
            article: article.clone(),
            summary,
            sentiment,
        }
    }

    /// Analyze a batch concurrently; results keep the input order.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn analyze_batch(&self, articles: &[Article]) -> Vec<AnalyzedArticle> {
        let t0 = Instant::now();
        let analyzed: Vec<AnalyzedArticle> = stream::iter(articles)
            .map(|article| self.analyze(article))
            .buffered(articles.len().max(1))
            .collect()
            .await;
        info!(
            count = analyzed.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Analyzed articles"
        );
        analyzed
    }

    async fn summarize(&self, content: &str) -> Option<String> {
        let body = self.request(&self.config.summarization_model, content).await?;
        let summary = parse_summary(&body);
        if summary.is_none() {
            warn!(
                response_preview = %truncate_for_log(&body, 300),
                "Summarization response had no summary text"
            );
        }
        summary
    }

    async fn classify(&self, summary: &str) -> Option<Sentiment> {
        let body = self.request(&self.config.sentiment_model, summary).await?;
        let Some(scores) = parse_label_scores(&body) else {
            warn!(
                response_preview = %truncate_for_log(&body, 300),
                "Sentiment response was not a label/score list"
            );
            return None;
        };
        let top = top_label(&scores)?;
        let sentiment = Sentiment::from_label(&top.label);
        if sentiment.is_none() {
            warn!(label = %top.label, "Unmapped sentiment label");
        }
        sentiment
    }

    /// One bounded inference call. `None` when a precondition fails, the
    /// call errors, or it runs past the timeout.
    async fn request(&self, model: &str, inputs: &str) -> Option<String> {
        if !self.client.is_configured() {
            debug!(%model, "Inference not configured");
            return None;
        }
        if inputs.is_empty() || inputs.chars().count() > self.config.max_content_length {
            debug!(%model, chars = inputs.chars().count(), "Inference input out of bounds");
            return None;
        }

        let t0 = Instant::now();
        match timeout(self.config.request_timeout(), self.client.infer(model, inputs)).await {
            Ok(Ok(body)) => Some(body),
            Ok(Err(e)) => {
                warn!(%model, error = %e, "Inference call failed; using fallback");
                None
            }
            Err(_) => {
                warn!(
                    %model,
                    elapsed_ms = t0.elapsed().as_millis(),
                    "Inference call timed out; using fallback"
                );
                None
            }
        }
    }
}

/// First `max_chars` characters of `content`, with an ellipsis if anything
/// was cut.
pub fn fallback_summary(content: &str, max_chars: usize) -> String {
    let head = truncate_chars(content, max_chars);
    if head.len() < content.len() {
        format!("{}{}", head, ELLIPSIS)
    } else {
        head.to_string()
    }
}
