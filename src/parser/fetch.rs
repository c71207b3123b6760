//! Live page fetching
//!
//! [`LivePageParser`] is the production [`PageParser`]: it fetches `http(s)`
//! URLs over the network and treats anything else as a local filesystem path,
//! which keeps offline corpora and test fixtures crawlable without a server.
//! Every failure mode collapses to an empty page, so the crawl engine never
//! sees a fetch error.

use crate::parser::html::extract_page;
use crate::parser::{PageParser, ParsedPage};
use crate::profiler::ProfiledTarget;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Fetches and tokenizes real pages over HTTP or from the local filesystem
pub struct LivePageParser {
    client: Client,
    ignored_words: Vec<Regex>,
}

/// Builds the shared HTTP client used for all page fetches
///
/// The request timeout is the whole-crawl timeout: no single page is allowed
/// to outlive the crawl that requested it. Redirects follow reqwest's default
/// policy, and the final post-redirect URL becomes the base for resolving the
/// page's links.
fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Decides whether a response body is worth tokenizing
///
/// Any `text/*` type is tokenized, so plain-text pages contribute words even
/// though they carry no markup. XML-family documents (`application/xml`,
/// `application/xhtml+xml` and friends) are parsed the same way. Explicit
/// binary types yield an empty page; a missing Content-Type is given the
/// benefit of the doubt.
fn parseable_content_type(content_type: &str) -> bool {
    if content_type.is_empty() {
        return true;
    }
    // Strip parameters such as "; charset=utf-8" before comparing.
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xml" || mime.ends_with("+xml")
}

impl LivePageParser {
    /// Creates a parser with a fresh HTTP client
    ///
    /// # Arguments
    ///
    /// * `timeout` - Upper bound for any single page fetch
    /// * `ignored_words` - Raw-token patterns excluded from word counting
    pub fn new(timeout: Duration, ignored_words: Vec<Regex>) -> crate::Result<Self> {
        let client = build_http_client(timeout)?;
        Ok(Self {
            client,
            ignored_words,
        })
    }

    async fn parse_remote(&self, url: &str) -> ParsedPage {
        let request_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Skipping malformed URL {}: {}", url, e);
                return ParsedPage::empty();
            }
        };

        let response = match self.client.get(request_url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Fetch failed for {}: {}", url, e);
                return ParsedPage::empty();
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Skipping {} (HTTP {})", url, response.status());
            return ParsedPage::empty();
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !parseable_content_type(&content_type) {
            tracing::debug!("Skipping {} (content type {})", url, content_type);
            return ParsedPage::empty();
        }

        // Redirects may have moved us; resolve links against where we landed.
        let final_url = response.url().clone();

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!("Failed to read body of {}: {}", url, e);
                return ParsedPage::empty();
            }
        };

        extract_page(&body, &final_url, &self.ignored_words)
    }

    async fn parse_local(&self, url: &str) -> ParsedPage {
        let path = url.strip_prefix("file://").unwrap_or(url);

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Failed to read local page {}: {}", path, e);
                return ParsedPage::empty();
            }
        };

        let base_url = match tokio::fs::canonicalize(path)
            .await
            .ok()
            .and_then(|absolute| Url::from_file_path(absolute).ok())
        {
            Some(base_url) => base_url,
            None => {
                tracing::debug!("No file URL for local page {}", path);
                return ParsedPage::empty();
            }
        };

        extract_page(&content, &base_url, &self.ignored_words)
    }
}

#[async_trait]
impl PageParser for LivePageParser {
    async fn parse(&self, url: &str) -> ParsedPage {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.parse_remote(url).await
        } else {
            self.parse_local(url).await
        }
    }
}

impl ProfiledTarget for LivePageParser {
    fn target_name(&self) -> &'static str {
        "LivePageParser"
    }

    fn profiled_operations(&self) -> &'static [&'static str] {
        &["parse"]
    }
}
