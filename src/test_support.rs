//! In-process fakes for the source, inference and store traits, and a
//! loopback HTTP server for the real network clients.

use crate::error::{DigestError, Result};
use crate::inference::InferenceClient;
use crate::models::{AnalyzedArticle, Article};
use crate::pipeline::DigestStore;
use crate::sources::{Feed, FeedFetcher, SearchSource};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub fn article(title: &str, url: &str) -> Article {
    Article {
        title: title.to_string(),
        url: url.to_string(),
        source: "Test Source".to_string(),
        published_at: Some("2025-05-06T14:30:00Z".to_string()),
        content: format!("{} content", title),
    }
}

pub fn article_with_content(content: &str) -> Article {
    Article {
        title: "Trump headline".to_string(),
        url: format!("https://example.com/{}", content.len()),
        source: "Test Source".to_string(),
        published_at: None,
        content: content.to_string(),
    }
}

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Scripted [`InferenceClient`]: fixed body per model, unknown models fail.
pub struct FakeInference {
    configured: bool,
    responses: HashMap<String, String>,
    delay: Option<DelayFn>,
    calls: AtomicUsize,
    inputs: Mutex<Vec<(String, String)>>,
}

impl FakeInference {
    pub fn configured() -> Self {
        Self {
            configured: true,
            responses: HashMap::new(),
            delay: None,
            calls: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::configured()
        }
    }

    pub fn respond(mut self, model: &str, body: &str) -> Self {
        self.responses.insert(model.to_string(), body.to_string());
        self
    }

    pub fn fail(mut self, model: &str) -> Self {
        self.responses.remove(model);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_per_input(move |_| delay)
    }

    pub fn with_delay_per_input(
        mut self,
        delay: impl Fn(&str) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs_for(&self, model: &str) -> Vec<String> {
        self.inputs
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == model)
            .map(|(_, input)| input.clone())
            .collect()
    }
}

impl InferenceClient for FakeInference {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn infer(&self, model: &str, inputs: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs
            .lock()
            .unwrap()
            .push((model.to_string(), inputs.to_string()));

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(inputs)).await;
        }
        self.responses
            .get(model)
            .cloned()
            .ok_or_else(|| DigestError::Inference(format!("no scripted response for {}", model)))
    }
}

/// Scripted [`SearchSource`].
pub struct FakeSearch {
    configured: bool,
    articles: Option<Vec<Article>>,
    calls: AtomicUsize,
}

impl FakeSearch {
    pub fn returning(articles: Vec<Article>) -> Self {
        Self {
            configured: true,
            articles: Some(articles),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::returning(Vec::new())
        }
    }

    pub fn failing() -> Self {
        Self {
            articles: None,
            ..Self::returning(Vec::new())
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SearchSource for FakeSearch {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn search(&self) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.articles.clone().ok_or(DigestError::Status {
            endpoint: "https://search.test".to_string(),
            status: 503,
        })
    }
}

/// Scripted [`FeedFetcher`]; unknown urls fail with a 404.
#[derive(Default)]
pub struct FakeFeeds {
    feeds: HashMap<String, Feed>,
    requested: Mutex<Vec<String>>,
}

impl FakeFeeds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(mut self, url: &str, feed: Feed) -> Self {
        self.feeds.insert(url.to_string(), feed);
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.feeds.remove(url);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl FeedFetcher for FakeFeeds {
    async fn fetch_feed(&self, url: &str) -> Result<Feed> {
        self.requested.lock().unwrap().push(url.to_string());
        self.feeds
            .get(url)
            .cloned()
            .ok_or_else(|| DigestError::Status {
                endpoint: url.to_string(),
                status: 404,
            })
    }
}

/// [`DigestStore`] that keeps every persisted digest in memory.
#[derive(Default)]
pub struct MemoryStore {
    fail: bool,
    persisted: Mutex<Vec<Vec<AnalyzedArticle>>>,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn persisted(&self) -> Vec<Vec<AnalyzedArticle>> {
        self.persisted.lock().unwrap().clone()
    }
}

impl DigestStore for MemoryStore {
    async fn persist(&self, digest: &[AnalyzedArticle]) -> Result<()> {
        if self.fail {
            return Err(DigestError::Io(std::io::Error::other("disk full")));
        }
        self.persisted.lock().unwrap().push(digest.to_vec());
        Ok(())
    }
}

/// One request as seen by [`TestServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including the query string.
    pub path: String,
    headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Loopback HTTP/1.1 server answering every request with one canned
/// response, after an optional delay.
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestServer {
    pub async fn start(status: u16, body: &str) -> Self {
        Self::start_slow(status, body, Duration::ZERO).await
    }

    pub async fn start_slow(status: u16, body: &str, delay: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let body = body.to_string();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let body = body.clone();
                tokio::spawn(async move {
                    serve_one(stream, status, &body, delay, &recorded).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn serve_one(
    mut stream: TcpStream,
    status: u16,
    body: &str,
    delay: Duration,
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    recorded.lock().unwrap().push(request);

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    let response = format!(
        "HTTP/1.1 {} Test\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Some(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&buf[header_end..]).into_owned(),
    })
}
