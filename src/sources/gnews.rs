//! GNews search API source.
//!
//! Issues a single search request for the configured topic query and maps
//! the returned results into [`Article`]s. The API is already topic-scoped
//! by its query, so no keyword filter is applied to the results.

use super::SearchSource;
use crate::config::CollectorConfig;
use crate::error::{DigestError, Result};
use crate::models::Article;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Fallback source label when a result carries no `source.name`.
const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    articles: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    title: Option<String>,
    url: Option<String>,
    description: Option<String>,
    published_at: Option<String>,
    source: Option<SearchItemSource>,
}

#[derive(Debug, Deserialize)]
struct SearchItemSource {
    name: Option<String>,
}

/// Search client for the GNews v4 API.
pub struct GNewsSource {
    client: Client,
    endpoint: String,
    query: String,
    language: String,
    max_results: usize,
    timeout: Duration,
    api_key: Option<String>,
}

impl std::fmt::Debug for GNewsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GNewsSource")
            .field("endpoint", &self.endpoint)
            .field("query", &self.query)
            .field("max_results", &self.max_results)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GNewsSource {
    /// Build a source from collector settings. An empty key counts as absent.
    pub fn new(client: Client, config: &CollectorConfig, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: config.search_endpoint.clone(),
            query: config.search_query.clone(),
            language: config.search_language.clone(),
            max_results: config.search_result_limit,
            timeout: config.request_timeout(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn request_url(&self, api_key: &str) -> Result<Url> {
        let max = self.max_results.to_string();
        Ok(Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", self.query.as_str()),
                ("lang", self.language.as_str()),
                ("max", max.as_str()),
                ("apikey", api_key),
            ],
        )?)
    }
}

impl SearchSource for GNewsSource {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[instrument(level = "info", skip_all, fields(endpoint = %self.endpoint))]
    async fn search(&self) -> Result<Vec<Article>> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(Vec::new());
        };
        let url = self.request_url(api_key)?;

        let t0 = Instant::now();
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis(),
            bytes = body.len(),
            "GNews responded"
        );

        let articles = parse_search_response(&body)?;
        info!(count = articles.len(), "Collected GNews articles");
        Ok(articles)
    }
}

/// Parse a search response body into normalized articles.
///
/// A body without an `articles` array yields no articles.
pub(crate) fn parse_search_response(body: &str) -> Result<Vec<Article>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    let Some(items) = response.articles else {
        warn!("No articles found in GNews response");
        return Ok(Vec::new());
    };
    Ok(items.into_iter().filter_map(normalize).collect())
}

fn normalize(item: SearchItem) -> Option<Article> {
    let title = item.title.filter(|t| !t.is_empty())?;
    let url = item.url.filter(|u| !u.is_empty())?;
    let description = item.description.filter(|d| !d.is_empty())?;

    let source = item
        .source
        .and_then(|s| s.name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    Some(Article {
        title: title.trim().to_string(),
        url,
        source,
        published_at: item.published_at,
        content: description.trim().to_string(),
    })
}
