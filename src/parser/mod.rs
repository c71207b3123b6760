//! Page fetching and tokenization
//!
//! This module owns the single-page half of the pipeline: given a URL it
//! produces the page's word counts and outbound links. The crawl engine
//! consumes this through the [`PageParser`] trait and never deals with HTML,
//! HTTP, or tokenization itself.

mod fetch;
mod html;

pub use fetch::LivePageParser;
pub use html::extract_page;

use async_trait::async_trait;
use std::collections::HashMap;

/// Everything the crawl engine needs from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Occurrences of each counted word on the page
    pub word_counts: HashMap<String, usize>,

    /// Outbound links in document order, deduplicated within the page
    pub links: Vec<String>,
}

impl ParsedPage {
    /// Returns a page with no words and no links, used for every kind of
    /// fetch or parse failure.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A single-page fetch-and-tokenize capability
///
/// `parse` never fails: a malformed URL, an unreachable host, a binary
/// response, or any other per-page problem yields an empty [`ParsedPage`],
/// so a single bad page can never abort a crawl. The URL that produced the
/// empty page still counts as visited; that bookkeeping belongs to the
/// engine, not the parser.
#[async_trait]
pub trait PageParser: Send + Sync {
    /// Fetches and tokenizes a single page
    async fn parse(&self, url: &str) -> ParsedPage;
}
