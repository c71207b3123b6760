//! Single-task crawl engine
//!
//! Visits pages one at a time with plain async recursion on the calling
//! task. There is no concurrency, so shared-state contention is impossible
//! and the dispatch order is the depth-first order of the link graph. Used
//! when the resolved parallelism is 1.

use crate::crawler::state::{CrawlState, CrawlTask};
use crate::crawler::{CrawlEngine, CrawlResult};
use crate::parser::PageParser;
use crate::profiler::ProfiledTarget;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Crawl engine that visits one page at a time
pub struct SequentialCrawler {
    parser: Arc<dyn PageParser>,
    max_depth: u32,
    timeout: Duration,
    popular_word_count: usize,
    ignored_urls: Vec<Regex>,
}

impl SequentialCrawler {
    /// Creates a new sequential crawler
    ///
    /// # Arguments
    ///
    /// * `parser` - Parser invoked for every visited page
    /// * `max_depth` - Link-following budget from each starting URL
    /// * `timeout` - Wall-clock budget for the whole crawl
    /// * `popular_word_count` - Ranking cutoff, 0 keeps every word
    /// * `ignored_urls` - URLs matching any pattern are never visited
    pub fn new(
        parser: Arc<dyn PageParser>,
        max_depth: u32,
        timeout: Duration,
        popular_word_count: usize,
        ignored_urls: Vec<Regex>,
    ) -> Self {
        Self {
            parser,
            max_depth,
            timeout,
            popular_word_count,
            ignored_urls,
        }
    }

    fn is_ignored(&self, url: &str) -> bool {
        self.ignored_urls.iter().any(|pattern| pattern.is_match(url))
    }

    /// Visits one URL, then each of its outbound links in turn
    ///
    /// Boxing makes the recursive async call representable; every level
    /// shares the same deadline computed at crawl start.
    fn visit<'a>(
        &'a self,
        state: &'a CrawlState,
        task: CrawlTask,
        deadline: Instant,
    ) -> BoxFuture<'a, ()> {
        async move {
            if task.depth == 0 || Instant::now() > deadline {
                return;
            }
            if self.is_ignored(&task.url) {
                tracing::debug!("Skipping ignored URL: {}", task.url);
                return;
            }
            if !state.visited.claim(&task.url) {
                return;
            }

            tracing::debug!("Visiting {} (depth budget {})", task.url, task.depth);
            let page = self.parser.parse(&task.url).await;
            state.words.merge(&page.word_counts);

            for link in page.links {
                let child = CrawlTask {
                    url: link,
                    depth: task.depth - 1,
                };
                self.visit(state, child, deadline).await;
            }
        }
        .boxed()
    }
}

#[async_trait]
impl CrawlEngine for SequentialCrawler {
    async fn crawl(&self, starting_urls: &[String]) -> CrawlResult {
        let deadline = Instant::now() + self.timeout;
        let state = CrawlState::new();

        tracing::info!(
            "Starting sequential crawl of {} start page(s), max depth {}",
            starting_urls.len(),
            self.max_depth
        );

        for url in starting_urls {
            let task = CrawlTask {
                url: url.clone(),
                depth: self.max_depth,
            };
            self.visit(&state, task, deadline).await;
        }

        let result = state.finish(self.popular_word_count);
        tracing::info!(
            "Sequential crawl complete: {} URL(s) visited, {} ranked word(s)",
            result.urls_visited,
            result.word_counts.len()
        );
        result
    }

    fn max_parallelism(&self) -> usize {
        1
    }
}

impl ProfiledTarget for SequentialCrawler {
    fn target_name(&self) -> &'static str {
        "SequentialCrawler"
    }

    fn profiled_operations(&self) -> &'static [&'static str] {
        &["crawl"]
    }
}
