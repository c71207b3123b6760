//! Worker-pool crawl engine
//!
//! Runs the crawl as a structured fork/join: every branch is a spawned task
//! that visits one URL, then spawns a child branch per outbound link and
//! waits for all of them before finishing. A global semaphore caps how many
//! branches are inside the visit section at once, so the worker count bounds
//! concurrent parses no matter how wide the link graph fans out.
//!
//! Branches share the deadline, the visited set, and the word counts; the
//! visited set's atomic claim guarantees a page reached over several paths
//! is parsed exactly once.

use crate::crawler::state::{CrawlState, CrawlTask};
use crate::crawler::{CrawlEngine, CrawlResult};
use crate::parser::PageParser;
use crate::profiler::ProfiledTarget;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;

/// Crawl engine that fans branches out over a bounded worker pool
pub struct ParallelCrawler {
    parser: Arc<dyn PageParser>,
    max_depth: u32,
    timeout: Duration,
    popular_word_count: usize,
    ignored_urls: Arc<Vec<Regex>>,
    workers: usize,
}

impl ParallelCrawler {
    /// Creates a new parallel crawler
    ///
    /// # Arguments
    ///
    /// * `parser` - Parser invoked for every visited page
    /// * `max_depth` - Link-following budget from each starting URL
    /// * `timeout` - Wall-clock budget for the whole crawl
    /// * `popular_word_count` - Ranking cutoff, 0 keeps every word
    /// * `ignored_urls` - URLs matching any pattern are never visited
    /// * `workers` - Maximum number of concurrent page visits
    pub fn new(
        parser: Arc<dyn PageParser>,
        max_depth: u32,
        timeout: Duration,
        popular_word_count: usize,
        ignored_urls: Vec<Regex>,
        workers: usize,
    ) -> Self {
        Self {
            parser,
            max_depth,
            timeout,
            popular_word_count,
            ignored_urls: Arc::new(ignored_urls),
            workers,
        }
    }
}

/// One branch of the crawl: visit the task's URL, then fork a child branch
/// per outbound link and join them all
///
/// The semaphore permit covers only the visit section (entry checks, claim,
/// parse, merge) and is released before children are spawned, so a single
/// worker can still drain an arbitrarily deep graph. Entry checks run under
/// the permit so the deadline is evaluated when work could actually start,
/// not when the branch was queued.
fn branch(
    parser: Arc<dyn PageParser>,
    state: Arc<CrawlState>,
    ignored_urls: Arc<Vec<Regex>>,
    limiter: Arc<Semaphore>,
    task: CrawlTask,
    deadline: Instant,
) -> BoxFuture<'static, ()> {
    async move {
        let links = {
            let _permit = match limiter.acquire().await {
                Ok(permit) => permit,
                // The limiter is never closed while branches are running.
                Err(_) => return,
            };

            if task.depth == 0 || Instant::now() > deadline {
                return;
            }
            if ignored_urls.iter().any(|pattern| pattern.is_match(&task.url)) {
                tracing::debug!("Skipping ignored URL: {}", task.url);
                return;
            }
            if !state.visited.claim(&task.url) {
                return;
            }

            tracing::debug!("Visiting {} (depth budget {})", task.url, task.depth);
            let page = parser.parse(&task.url).await;
            state.words.merge(&page.word_counts);
            page.links
        };

        let mut children = JoinSet::new();
        for link in links {
            let child = CrawlTask {
                url: link,
                depth: task.depth - 1,
            };
            children.spawn(branch(
                parser.clone(),
                state.clone(),
                ignored_urls.clone(),
                limiter.clone(),
                child,
                deadline,
            ));
        }
        while let Some(joined) = children.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Crawl branch failed: {}", e);
            }
        }
    }
    .boxed()
}

#[async_trait]
impl CrawlEngine for ParallelCrawler {
    async fn crawl(&self, starting_urls: &[String]) -> CrawlResult {
        let deadline = Instant::now() + self.timeout;
        let state = Arc::new(CrawlState::new());
        let limiter = Arc::new(Semaphore::new(self.workers));

        tracing::info!(
            "Starting parallel crawl of {} start page(s), max depth {}, {} worker(s)",
            starting_urls.len(),
            self.max_depth,
            self.workers
        );

        let mut roots = JoinSet::new();
        for url in starting_urls {
            let task = CrawlTask {
                url: url.clone(),
                depth: self.max_depth,
            };
            roots.spawn(branch(
                self.parser.clone(),
                state.clone(),
                self.ignored_urls.clone(),
                limiter.clone(),
                task,
                deadline,
            ));
        }
        while let Some(joined) = roots.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("Crawl branch failed: {}", e);
            }
        }

        let result = state.finish(self.popular_word_count);
        tracing::info!(
            "Parallel crawl complete: {} URL(s) visited, {} ranked word(s)",
            result.urls_visited,
            result.word_counts.len()
        );
        result
    }

    fn max_parallelism(&self) -> usize {
        self.workers
    }
}

impl ProfiledTarget for ParallelCrawler {
    fn target_name(&self) -> &'static str {
        "ParallelCrawler"
    }

    fn profiled_operations(&self) -> &'static [&'static str] {
        &["crawl"]
    }
}
