//! Accumulated operation timings

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Process-wide aggregation of profiled call durations
///
/// Entries are keyed `Owner#operation` and hold the cumulative elapsed time
/// across every recorded call since the ledger was created. The map is
/// ordered, so the report comes out sorted by key with no extra sort step.
///
/// Recording is safe from any number of concurrent crawl branches: each call
/// adds to the existing entry under the lock, so no update is lost. Elapsed
/// time is a [`Duration`], which cannot represent a negative measurement.
#[derive(Debug, Default)]
pub struct ProfilingLedger {
    entries: Mutex<BTreeMap<String, Duration>>,
}

impl ProfilingLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one measured call to the entry for `owner` / `operation`
    pub fn record(&self, owner: &str, operation: &str, elapsed: Duration) {
        let key = format!("{owner}#{operation}");
        let mut entries = self.lock_entries();
        *entries.entry(key).or_insert(Duration::ZERO) += elapsed;
    }

    /// Cumulative elapsed time recorded for one operation, if any
    pub fn elapsed(&self, owner: &str, operation: &str) -> Option<Duration> {
        let key = format!("{owner}#{operation}");
        self.lock_entries().get(&key).copied()
    }

    /// True when nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }

    /// Renders one line per operation, sorted by the textual key
    ///
    /// Each line shows the cumulative elapsed time for all calls to that
    /// operation, broken into minutes, seconds, and milliseconds:
    ///
    /// ```text
    /// LivePageParser#parse took 0m 3s 141ms
    /// ```
    pub fn report(&self) -> String {
        let entries = self.lock_entries();
        let mut out = String::new();
        for (key, elapsed) in entries.iter() {
            out.push_str(&format!("{} took {}\n", key, format_duration(*elapsed)));
        }
        out
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Duration>> {
        // A poisoned lock still holds valid timing data.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Formats a duration as minute / second / millisecond components
fn format_duration(duration: Duration) -> String {
    let minutes = duration.as_secs() / 60;
    let seconds = duration.as_secs() % 60;
    let millis = duration.subsec_millis();
    format!("{minutes}m {seconds}s {millis}ms")
}
