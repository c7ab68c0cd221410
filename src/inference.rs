//! Hosted inference API interaction.
//!
//! The analyzer talks to two hosted models, one for summarization and one
//! for sentiment classification. Both are reached through the
//! [`InferenceClient`] trait, so the analyzer can be exercised against
//! in-process fakes.
//!
//! # Wire format
//!
//! Requests are `POST {endpoint}/{model}` with a JSON body
//! `{"inputs": "<text>"}` and a bearer token. Responses:
//!
//! - summarization: `[{"summary_text": "..."}]`
//! - sentiment: `[[{"label": "LABEL_2", "score": 0.9}, ...]]`; a flat
//!   `[{"label": ..., "score": ...}]` list is accepted too
//!
//! There is no retry logic here. A failed call is reported once and the
//! caller falls back to a local value.

use crate::config::AnalyzerConfig;
use crate::error::{DigestError, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Trait for calls to a hosted model.
pub trait InferenceClient {
    /// Whether a credential is available. Unconfigured clients are never called.
    fn is_configured(&self) -> bool;

    /// Send `inputs` to `model` and return the raw response body.
    async fn infer(&self, model: &str, inputs: &str) -> Result<String>;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Client for the Hugging Face serverless inference API.
pub struct HfInference {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl fmt::Debug for HfInference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HfInference")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HfInference {
    /// Build a client. An empty key counts as absent.
    pub fn new(client: Client, config: &AnalyzerConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: config.inference_endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

impl InferenceClient for HfInference {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(level = "info", skip_all, fields(%model))]
    async fn infer(&self, model: &str, inputs: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DigestError::Inference("no API key configured".to_string()))?;

        let url = format!("{}/{}", self.endpoint, model);
        let body = serde_json::to_string(&InferenceRequest { inputs })?;

        let t0 = Instant::now();
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let dt = t0.elapsed();

        let status = response.status();
        if !status.is_success() {
            warn!(
                elapsed_ms = dt.as_millis(),
                status = status.as_u16(),
                "Inference call rejected"
            );
            return Err(DigestError::Status {
                endpoint: url,
                status: status.as_u16(),
            });
        }
        debug!(elapsed_ms = dt.as_millis(), "Inference call succeeded");
        Ok(response.text().await?)
    }
}

#[derive(Debug, Deserialize)]
struct SummaryItem {
    summary_text: Option<String>,
}

/// One classifier output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SentimentResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Extract the summary text from a summarization response.
///
/// Returns `None` for malformed bodies and for an empty summary.
pub fn parse_summary(body: &str) -> Option<String> {
    let items: Vec<SummaryItem> = serde_json::from_str(body).ok()?;
    items
        .into_iter()
        .next()?
        .summary_text
        .filter(|s| !s.trim().is_empty())
}

/// Extract the label/score pairs of the first input from a sentiment response.
pub fn parse_label_scores(body: &str) -> Option<Vec<LabelScore>> {
    match serde_json::from_str::<SentimentResponse>(body).ok()? {
        SentimentResponse::Nested(batches) => batches.into_iter().next(),
        SentimentResponse::Flat(scores) => Some(scores),
    }
}

/// The highest-scoring label; the first one wins on ties.
pub fn top_label(scores: &[LabelScore]) -> Option<&LabelScore> {
    scores.iter().fold(None, |best, candidate| match best {
        Some(b) if b.score >= candidate.score => Some(b),
        _ => Some(candidate),
    })
}
