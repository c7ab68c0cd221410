//! RSS 2.0 and Atom feed source.
//!
//! Feeds are fetched over HTTP and parsed with `feed-rs` into a [`Feed`].
//! Only the handful of fields the collector needs are kept: entry title,
//! link, publish date and a plain-text snippet.
//!
//! # Field mapping
//!
//! | Entry field | RSS 2.0 | Atom |
//! |-------------|---------|------|
//! | title | `<title>` | `<title>` |
//! | link | `<link>` | `<link href>` (alternate) |
//! | publish date | `<pubDate>` | `<published>`, then `<updated>` |
//! | snippet | `<description>`, then `<content:encoded>` | `<content>`, then `<summary>` |

use super::FeedFetcher;
use crate::config::CollectorConfig;
use crate::error::{DigestError, Result};
use crate::models::Article;
use crate::utils::html_to_text;
use chrono::SecondsFormat;
use feed_rs::model::{Entry, FeedType, Link};
use feed_rs::parser;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Source label used when a feed has no title of its own.
const FALLBACK_SOURCE: &str = "RSS Feed";

const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, */*";

/// A parsed syndication feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub title: Option<String>,
    /// Entries in document order, which for news feeds is newest first.
    pub entries: Vec<FeedEntry>,
}

/// One raw feed entry, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<String>,
    /// Markup-free text of the entry body.
    pub content_snippet: Option<String>,
}

impl Feed {
    /// Normalize the leading `limit` entries that mention `keyword`.
    ///
    /// An entry is accepted only if its title contains `keyword`
    /// (case-sensitive) and it has both a link and a publish date.
    pub fn accepted_articles(&self, keyword: &str, limit: usize) -> Vec<Article> {
        let source = self
            .title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_SOURCE);

        self.entries
            .iter()
            .take(limit)
            .filter_map(|entry| entry.to_article(keyword, source))
            .collect()
    }
}

impl FeedEntry {
    fn to_article(&self, keyword: &str, source: &str) -> Option<Article> {
        let title = self.title.as_deref().filter(|t| !t.is_empty())?;
        if !title.contains(keyword) {
            return None;
        }
        let link = self.link.as_deref().filter(|l| !l.is_empty())?;
        let pub_date = self.pub_date.as_deref().filter(|d| !d.is_empty())?;

        let content = self
            .content_snippet
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(title);

        Some(Article {
            title: title.trim().to_string(),
            url: link.to_string(),
            source: source.to_string(),
            published_at: Some(pub_date.to_string()),
            content: content.trim().to_string(),
        })
    }
}

/// Fetches feeds over HTTP with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFeedFetcher {
    client: Client,
    user_agent: String,
    timeout: Duration,
}

impl HttpFeedFetcher {
    pub fn new(client: Client, config: &CollectorConfig) -> Self {
        Self {
            client,
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout(),
        }
    }
}

impl FeedFetcher for HttpFeedFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_feed(&self, url: &str) -> Result<Feed> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, FEED_ACCEPT)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DigestError::Status {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let feed = parse_feed(&body)?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis(),
            entries = feed.entries.len(),
            "Parsed feed"
        );
        Ok(feed)
    }
}

/// The article URL: first alternate or untyped link, else the first link.
fn article_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}

fn to_feed_entry(entry: Entry, atom: bool) -> FeedEntry {
    let summary = entry.summary.map(|t| t.content);
    let content = entry.content.and_then(|c| c.body);
    let body = if atom {
        content.or(summary)
    } else {
        summary.or(content)
    };

    FeedEntry {
        title: entry
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty()),
        link: article_link(&entry.links),
        pub_date: entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
        content_snippet: body.map(|b| html_to_text(&b)).filter(|s| !s.is_empty()),
    }
}

/// Parse an RSS 0.9x/1.0/2.0, Atom or JSON Feed document.
///
/// Publish dates are normalized to RFC 3339 in UTC; Atom entries without
/// `<published>` use `<updated>`.
///
/// # Errors
///
/// Returns [`DigestError::Feed`] when the document is not well-formed or
/// has no feed root element.
pub fn parse_feed(xml: &str) -> Result<Feed> {
    let parsed = parser::parse(xml.as_bytes())?;
    let atom = matches!(parsed.feed_type, FeedType::Atom);

    Ok(Feed {
        title: parsed
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty()),
        entries: parsed
            .entries
            .into_iter()
            .map(|entry| to_feed_entry(entry, atom))
            .collect(),
    })
}
