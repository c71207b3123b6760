//! Crawl engines
//!
//! Two engines implement the same traversal contract behind [`CrawlEngine`]:
//! [`SequentialCrawler`] recurses on the calling task and is used when the
//! resolved parallelism is 1; [`ParallelCrawler`] runs a structured fork/join
//! over spawned tasks, bounded by a worker-pool semaphore. Both honor the
//! same entry checks per branch (depth budget, shared deadline, ignored-URL
//! patterns, visited-set dedup) and produce the same result for the same
//! input when the crawl finishes before its deadline.
//!
//! [`build_engine`] applies the configuration's selection rules and returns
//! the chosen engine already wrapped for profiling.

pub mod parallel;
pub mod sequential;
mod state;

pub use parallel::ParallelCrawler;
pub use sequential::SequentialCrawler;
pub use state::{CrawlState, CrawlTask, VisitedSet, WordCounts};

use crate::config::CrawlConfig;
use crate::parser::PageParser;
use crate::profiler::Profiler;
use crate::ConfigError;
use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;

/// Override name selecting [`SequentialCrawler`]
pub const OVERRIDE_SEQUENTIAL: &str = "sequential";

/// Override name selecting [`ParallelCrawler`]
pub const OVERRIDE_PARALLEL: &str = "parallel";

/// Final, immutable outcome of one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Ranked word counts, most popular first; the vector order is the rank
    /// order and survives serialization
    pub word_counts: Vec<(String, usize)>,

    /// Number of distinct URLs dispatched for visiting
    pub urls_visited: usize,
}

impl Serialize for CrawlResult {
    /// Serializes as `{"wordCounts": {..}, "urlsVisited": n}` with the word
    /// map emitted in rank order
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct RankedCounts<'a>(&'a [(String, usize)]);

        impl Serialize for RankedCounts<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (word, count) in self.0 {
                    map.serialize_entry(word, count)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("wordCounts", &RankedCounts(&self.word_counts))?;
        map.serialize_entry("urlsVisited", &self.urls_visited)?;
        map.end()
    }
}

/// A bounded, deadline-aware crawl over a link graph
#[async_trait]
pub trait CrawlEngine: Send + Sync {
    /// Crawls from the given starting URLs until the frontier, the depth
    /// budget, or the deadline is exhausted
    ///
    /// A crawl cut short by its deadline is still a normal result covering
    /// whatever was visited in time.
    async fn crawl(&self, starting_urls: &[String]) -> CrawlResult;

    /// Upper bound on concurrent page visits this engine can drive
    fn max_parallelism(&self) -> usize;
}

#[derive(Debug, PartialEq, Eq)]
enum EngineChoice {
    Sequential,
    Parallel { workers: usize },
}

/// Applies the selection rules to pick an engine
///
/// `target` is the resolved desired parallelism, `available` the hardware
/// parallelism. With no override, target 1 selects the sequential engine and
/// anything larger the parallel engine with its worker count capped at the
/// hardware. A forced implementation that cannot satisfy the target is a
/// configuration error rather than a silent downgrade.
fn choose_engine(
    override_name: &str,
    target: usize,
    available: usize,
) -> Result<EngineChoice, ConfigError> {
    match override_name.trim() {
        "" => {
            if target <= 1 {
                Ok(EngineChoice::Sequential)
            } else {
                Ok(EngineChoice::Parallel {
                    workers: target.min(available).max(1),
                })
            }
        }
        OVERRIDE_SEQUENTIAL => {
            if target > 1 {
                Err(ConfigError::UnsatisfiableOverride {
                    name: OVERRIDE_SEQUENTIAL.to_string(),
                    supported: 1,
                    requested: target,
                })
            } else {
                Ok(EngineChoice::Sequential)
            }
        }
        OVERRIDE_PARALLEL => {
            if target > available {
                Err(ConfigError::UnsatisfiableOverride {
                    name: OVERRIDE_PARALLEL.to_string(),
                    supported: available,
                    requested: target,
                })
            } else {
                Ok(EngineChoice::Parallel {
                    workers: target.max(1),
                })
            }
        }
        other => Err(ConfigError::UnknownImplementation(other.to_string())),
    }
}

/// Builds the engine selected by the configuration, wrapped for profiling
///
/// # Arguments
///
/// * `config` - Validated crawl configuration
/// * `parser` - The page parser every branch will call
/// * `profiler` - Profiler whose ledger receives the engine's timings
///
/// # Returns
///
/// * `Ok(engine)` - The selected engine behind the [`CrawlEngine`] trait
/// * `Err(LexiError)` - Selection failed or the engine could not be wrapped
pub fn build_engine(
    config: &CrawlConfig,
    parser: Arc<dyn PageParser>,
    profiler: &Profiler,
) -> crate::Result<Box<dyn CrawlEngine>> {
    let ignored_urls = config.ignored_url_patterns()?;
    let choice = choose_engine(
        &config.implementation_override,
        config.target_parallelism(),
        num_cpus::get(),
    )?;

    match choice {
        EngineChoice::Sequential => {
            tracing::info!("Using sequential crawler");
            let engine = SequentialCrawler::new(
                parser,
                config.max_depth,
                config.timeout(),
                config.popular_word_count,
                ignored_urls,
            );
            Ok(Box::new(profiler.wrap_crawler(engine)?))
        }
        EngineChoice::Parallel { workers } => {
            tracing::info!("Using parallel crawler with {} workers", workers);
            let engine = ParallelCrawler::new(
                parser,
                config.max_depth,
                config.timeout(),
                config.popular_word_count,
                ignored_urls,
                workers,
            );
            Ok(Box::new(profiler.wrap_crawler(engine)?))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::parser::{PageParser, ParsedPage};
    use crate::profiler::ProfiledTarget;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Deterministic in-memory page graph for engine tests
    ///
    /// Pages are declared up front; unknown URLs parse to an empty page, the
    /// same way a live fetch failure would. Every dispatch is logged, and the
    /// peak number of simultaneously running `parse` calls is tracked so
    /// tests can assert the worker-pool bound.
    pub(crate) struct FakeParser {
        pages: HashMap<String, ParsedPage>,
        delays: HashMap<String, Duration>,
        dispatched: Mutex<Vec<String>>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl FakeParser {
        pub(crate) fn new() -> Self {
            Self {
                pages: HashMap::new(),
                delays: HashMap::new(),
                dispatched: Mutex::new(Vec::new()),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }

        /// Declares a page with its words and outbound links
        pub(crate) fn page(mut self, url: &str, words: &[(&str, usize)], links: &[&str]) -> Self {
            let word_counts = words
                .iter()
                .map(|(word, n)| (word.to_string(), *n))
                .collect();
            let links = links.iter().map(|link| link.to_string()).collect();
            self.pages
                .insert(url.to_string(), ParsedPage { word_counts, links });
            self
        }

        /// Makes parsing the given URL take this long (in virtual time)
        pub(crate) fn delay(mut self, url: &str, delay: Duration) -> Self {
            self.delays.insert(url.to_string(), delay);
            self
        }

        /// URLs handed to `parse`, in dispatch order
        pub(crate) fn dispatched(&self) -> Vec<String> {
            self.dispatched.lock().unwrap().clone()
        }

        /// Highest number of `parse` calls ever in flight at once
        pub(crate) fn peak_concurrency(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageParser for FakeParser {
        async fn parse(&self, url: &str) -> ParsedPage {
            self.dispatched.lock().unwrap().push(url.to_string());

            let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(active, Ordering::SeqCst);

            if let Some(delay) = self.delays.get(url) {
                tokio::time::sleep(*delay).await;
            }

            self.active.fetch_sub(1, Ordering::SeqCst);
            self.pages.get(url).cloned().unwrap_or_default()
        }
    }

    impl ProfiledTarget for FakeParser {
        fn target_name(&self) -> &'static str {
            "FakeParser"
        }

        fn profiled_operations(&self) -> &'static [&'static str] {
            &["parse"]
        }
    }
}
