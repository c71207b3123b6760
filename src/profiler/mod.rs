//! Call profiling
//!
//! This module measures how much wall-clock time is spent inside designated
//! operations, without the measured code knowing about it. A capability is
//! wrapped in a decorator ([`ProfiledParser`], [`ProfiledCrawler`]) that
//! intercepts its designated operations and commits the elapsed time of each
//! call into a shared [`ProfilingLedger`]. The [`Profiler`] owns the ledger,
//! hands out wrappers, and renders the final report.
//!
//! The profiler is constructed once at process start and injected where
//! wrapping happens; nothing in this module is a global.

mod ledger;
mod proxy;

pub use ledger::ProfilingLedger;
pub use proxy::{ProfiledCrawler, ProfiledParser};

use crate::crawler::CrawlEngine;
use crate::parser::PageParser;
use crate::ProfilerResult;
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Implemented by capabilities that designate operations for timing
///
/// The wrapper layer reads this description when a delegate is wrapped; the
/// delegate itself never interacts with the ledger.
pub trait ProfiledTarget {
    /// Name the timings are recorded under, conventionally the concrete type
    /// name
    fn target_name(&self) -> &'static str;

    /// Operations designated for timing; wrapping fails when this is empty
    fn profiled_operations(&self) -> &'static [&'static str];
}

/// Entry point to the profiling layer
///
/// Owns the process-wide ledger and remembers when it was created; that
/// moment becomes the `Run at` header of the report.
pub struct Profiler {
    ledger: Arc<ProfilingLedger>,
    started_at: DateTime<Local>,
}

impl Profiler {
    /// Creates a profiler with a fresh, empty ledger
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(ProfilingLedger::new()),
            started_at: Local::now(),
        }
    }

    /// Shared handle to the underlying ledger
    pub fn ledger(&self) -> Arc<ProfilingLedger> {
        Arc::clone(&self.ledger)
    }

    /// Wraps a page parser so its designated operations are timed
    ///
    /// # Returns
    ///
    /// * `Ok(ProfiledParser)` - Decorator recording into this profiler's ledger
    /// * `Err(ProfilerError)` - The delegate designates no profiled operations
    pub fn wrap_parser<P>(&self, delegate: P) -> ProfilerResult<ProfiledParser<P>>
    where
        P: PageParser + ProfiledTarget,
    {
        ProfiledParser::new(delegate, self.ledger())
    }

    /// Wraps a crawl engine so its designated operations are timed
    ///
    /// # Returns
    ///
    /// * `Ok(ProfiledCrawler)` - Decorator recording into this profiler's ledger
    /// * `Err(ProfilerError)` - The delegate designates no profiled operations
    pub fn wrap_crawler<C>(&self, delegate: C) -> ProfilerResult<ProfiledCrawler<C>>
    where
        C: CrawlEngine + ProfiledTarget,
    {
        ProfiledCrawler::new(delegate, self.ledger())
    }

    /// Writes the timing report to the given destination
    ///
    /// The report starts with a `Run at` header carrying the profiler's
    /// creation time, followed by one line per recorded operation in key
    /// order, and ends with a blank line so appended runs stay separated.
    pub fn write_report(&self, destination: &mut dyn Write) -> crate::Result<()> {
        writeln!(destination, "Run at {}", self.started_at.to_rfc2822())?;
        destination.write_all(self.ledger.report().as_bytes())?;
        writeln!(destination)?;
        Ok(())
    }

    /// Appends the timing report to the file at `path`
    ///
    /// The file is created if missing; existing contents are kept, so
    /// successive runs accumulate a history.
    pub fn write_report_to_path(&self, path: &Path) -> crate::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.write_report(&mut file)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_report_has_header_and_trailing_blank_line() {
        let profiler = Profiler::new();
        profiler
            .ledger()
            .record("Parser", "parse", Duration::from_secs(2));

        let mut out = Vec::new();
        profiler.write_report(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.starts_with("Run at "));
        assert!(report.contains("Parser#parse took 0m 2s 0ms\n"));
        assert!(report.ends_with("\n\n"));
    }

    #[test]
    fn test_write_report_to_path_appends() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let profiler = Profiler::new();
        profiler
            .ledger()
            .record("Parser", "parse", Duration::from_secs(1));

        profiler.write_report_to_path(file.path()).unwrap();
        profiler.write_report_to_path(file.path()).unwrap();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.matches("Run at ").count(), 2);
        assert_eq!(contents.matches("Parser#parse").count(), 2);
    }
}
