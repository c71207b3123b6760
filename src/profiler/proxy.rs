//! Decorator wrappers that time designated operations
//!
//! A wrapped capability behaves exactly like its delegate: non-profiled
//! operations are forwarded untouched, and equality, hashing, and debug
//! formatting all come from the delegate, so two wrappers over equal
//! delegates compare equal. Timing is committed by a guard when it drops,
//! which means a call that panics (or is abandoned mid-flight) is still
//! recorded, and the panic itself propagates to the caller unchanged.

use crate::crawler::{CrawlEngine, CrawlResult};
use crate::parser::{PageParser, ParsedPage};
use crate::profiler::{ProfiledTarget, ProfilingLedger};
use crate::{ProfilerError, ProfilerResult};
use async_trait::async_trait;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::time::Instant;

/// Commits elapsed time to the ledger when dropped
struct OperationTimer {
    ledger: Arc<ProfilingLedger>,
    owner: &'static str,
    operation: &'static str,
    started: Instant,
}

impl OperationTimer {
    fn start(ledger: Arc<ProfilingLedger>, owner: &'static str, operation: &'static str) -> Self {
        Self {
            ledger,
            owner,
            operation,
            started: Instant::now(),
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        self.ledger
            .record(self.owner, self.operation, self.started.elapsed());
    }
}

/// Refuses to wrap a delegate that designates nothing for timing
fn ensure_profiled<T: ProfiledTarget>(delegate: &T) -> ProfilerResult<()> {
    if delegate.profiled_operations().is_empty() {
        Err(ProfilerError::NoProfiledOperations(delegate.target_name()))
    } else {
        Ok(())
    }
}

/// A [`PageParser`] decorator that times its designated operations
pub struct ProfiledParser<P> {
    delegate: P,
    ledger: Arc<ProfilingLedger>,
    owner: &'static str,
    time_parse: bool,
}

impl<P> ProfiledParser<P>
where
    P: PageParser + ProfiledTarget,
{
    pub(crate) fn new(delegate: P, ledger: Arc<ProfilingLedger>) -> ProfilerResult<Self> {
        ensure_profiled(&delegate)?;
        let owner = delegate.target_name();
        let time_parse = delegate.profiled_operations().contains(&"parse");
        Ok(Self {
            delegate,
            ledger,
            owner,
            time_parse,
        })
    }
}

#[async_trait]
impl<P> PageParser for ProfiledParser<P>
where
    P: PageParser + ProfiledTarget,
{
    async fn parse(&self, url: &str) -> ParsedPage {
        if !self.time_parse {
            return self.delegate.parse(url).await;
        }

        let _timer = OperationTimer::start(Arc::clone(&self.ledger), self.owner, "parse");
        self.delegate.parse(url).await
    }
}

impl<P: fmt::Debug> fmt::Debug for ProfiledParser<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.delegate.fmt(f)
    }
}

impl<P: PartialEq> PartialEq for ProfiledParser<P> {
    fn eq(&self, other: &Self) -> bool {
        self.delegate == other.delegate
    }
}

impl<P: Eq> Eq for ProfiledParser<P> {}

impl<P: PartialEq> PartialEq<P> for ProfiledParser<P> {
    fn eq(&self, other: &P) -> bool {
        self.delegate == *other
    }
}

impl<P: Hash> Hash for ProfiledParser<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.delegate.hash(state)
    }
}

/// A [`CrawlEngine`] decorator that times its designated operations
pub struct ProfiledCrawler<C> {
    delegate: C,
    ledger: Arc<ProfilingLedger>,
    owner: &'static str,
    time_crawl: bool,
}

impl<C> ProfiledCrawler<C>
where
    C: CrawlEngine + ProfiledTarget,
{
    pub(crate) fn new(delegate: C, ledger: Arc<ProfilingLedger>) -> ProfilerResult<Self> {
        ensure_profiled(&delegate)?;
        let owner = delegate.target_name();
        let time_crawl = delegate.profiled_operations().contains(&"crawl");
        Ok(Self {
            delegate,
            ledger,
            owner,
            time_crawl,
        })
    }
}

#[async_trait]
impl<C> CrawlEngine for ProfiledCrawler<C>
where
    C: CrawlEngine + ProfiledTarget,
{
    async fn crawl(&self, starting_urls: &[String]) -> CrawlResult {
        if !self.time_crawl {
            return self.delegate.crawl(starting_urls).await;
        }

        let _timer = OperationTimer::start(Arc::clone(&self.ledger), self.owner, "crawl");
        self.delegate.crawl(starting_urls).await
    }

    fn max_parallelism(&self) -> usize {
        self.delegate.max_parallelism()
    }
}

impl<C: fmt::Debug> fmt::Debug for ProfiledCrawler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.delegate.fmt(f)
    }
}

impl<C: PartialEq> PartialEq for ProfiledCrawler<C> {
    fn eq(&self, other: &Self) -> bool {
        self.delegate == other.delegate
    }
}

impl<C: Eq> Eq for ProfiledCrawler<C> {}

impl<C: PartialEq> PartialEq<C> for ProfiledCrawler<C> {
    fn eq(&self, other: &C) -> bool {
        self.delegate == *other
    }
}

impl<C: Hash> Hash for ProfiledCrawler<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.delegate.hash(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::Profiler;
    use futures::FutureExt;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashMap;
    use std::panic::AssertUnwindSafe;
    use std::time::Duration;

    /// Test parser that takes one virtual second per call
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct StubParser {
        label: &'static str,
        operations: &'static [&'static str],
        panics: bool,
    }

    impl StubParser {
        fn profiled() -> Self {
            Self {
                label: "stub",
                operations: &["parse"],
                panics: false,
            }
        }

        fn unprofiled_parse() -> Self {
            Self {
                label: "stub",
                operations: &["other"],
                panics: false,
            }
        }

        fn without_operations() -> Self {
            Self {
                label: "stub",
                operations: &[],
                panics: false,
            }
        }

        fn panicking() -> Self {
            Self {
                label: "stub",
                operations: &["parse"],
                panics: true,
            }
        }
    }

    #[async_trait]
    impl PageParser for StubParser {
        async fn parse(&self, _url: &str) -> ParsedPage {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if self.panics {
                panic!("expected failure");
            }
            ParsedPage {
                word_counts: HashMap::from([("stub".to_string(), 1)]),
                links: Vec::new(),
            }
        }
    }

    impl ProfiledTarget for StubParser {
        fn target_name(&self) -> &'static str {
            "StubParser"
        }

        fn profiled_operations(&self) -> &'static [&'static str] {
            self.operations
        }
    }

    #[test]
    fn test_wrap_fails_without_profiled_operations() {
        let profiler = Profiler::new();
        let result = profiler.wrap_parser(StubParser::without_operations());

        assert!(matches!(
            result,
            Err(ProfilerError::NoProfiledOperations("StubParser"))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_profiled_calls_aggregate_in_ledger() {
        let profiler = Profiler::new();
        let wrapped = profiler.wrap_parser(StubParser::profiled()).unwrap();

        let page = wrapped.parse("http://x.test").await;
        assert_eq!(page.word_counts.get("stub"), Some(&1));

        wrapped.parse("http://x.test").await;
        wrapped.parse("http://x.test").await;

        assert_eq!(
            profiler.ledger().elapsed("StubParser", "parse"),
            Some(Duration::from_secs(3))
        );
        assert!(profiler
            .ledger()
            .report()
            .contains("StubParser#parse took 0m 3s 0ms"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_profiled_operation_is_forwarded_untimed() {
        let profiler = Profiler::new();
        let wrapped = profiler
            .wrap_parser(StubParser::unprofiled_parse())
            .unwrap();

        let page = wrapped.parse("http://x.test").await;
        assert_eq!(page.word_counts.get("stub"), Some(&1));
        assert_eq!(profiler.ledger().elapsed("StubParser", "parse"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_call_is_recorded_and_rethrown() {
        let profiler = Profiler::new();
        let wrapped = profiler.wrap_parser(StubParser::panicking()).unwrap();

        let outcome = AssertUnwindSafe(wrapped.parse("http://x.test"))
            .catch_unwind()
            .await;

        let payload = outcome.expect_err("the panic must reach the caller");
        let message = payload.downcast_ref::<&str>().copied();
        assert_eq!(message, Some("expected failure"));

        assert_eq!(
            profiler.ledger().elapsed("StubParser", "parse"),
            Some(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_wrappers_over_equal_delegates_compare_equal() {
        let profiler = Profiler::new();
        let first = profiler.wrap_parser(StubParser::profiled()).unwrap();
        let second = profiler.wrap_parser(StubParser::profiled()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, StubParser::profiled());
    }

    #[test]
    fn test_wrapper_hash_and_debug_forward_to_delegate() {
        let profiler = Profiler::new();
        let delegate = StubParser::profiled();
        let wrapped = profiler.wrap_parser(delegate.clone()).unwrap();

        let mut wrapped_hasher = DefaultHasher::new();
        wrapped.hash(&mut wrapped_hasher);
        let mut delegate_hasher = DefaultHasher::new();
        delegate.hash(&mut delegate_hasher);

        assert_eq!(wrapped_hasher.finish(), delegate_hasher.finish());
        assert_eq!(format!("{wrapped:?}"), format!("{delegate:?}"));
    }
}
