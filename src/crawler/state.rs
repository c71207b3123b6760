//! Shared per-crawl state
//!
//! One crawl invocation owns one [`CrawlState`]: the set of URLs already
//! claimed for visiting and the running word counts. Both structures accept
//! concurrent mutation from any number of crawl branches without an external
//! lock, and both are discarded once the crawl's result is produced.

use crate::crawler::CrawlResult;
use crate::ranking::rank;
use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// A pending unit of crawl work
///
/// Created when a link is discovered, consumed when the branch visiting it is
/// dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// The URL to visit
    pub url: String,

    /// Remaining depth budget at which the URL must be visited
    pub depth: u32,
}

/// URLs already dispatched for visiting during one crawl
///
/// Claiming is a single atomic test-and-insert: when several branches
/// discover the same URL concurrently, exactly one wins the claim and gets to
/// fetch the page.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for visiting
    ///
    /// Returns `false` when another branch already holds the claim.
    pub fn claim(&self, url: &str) -> bool {
        self.urls.insert(url.to_string())
    }

    /// Membership test without claiming
    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// Number of distinct URLs claimed so far
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Cumulative word counts shared by every branch of one crawl
///
/// Merging sums per key, so merges from different branches commute and no
/// page is ever double counted as long as each page is parsed once.
#[derive(Debug, Default)]
pub struct WordCounts {
    counts: DashMap<String, usize>,
}

impl WordCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one page's counts into the running totals
    pub fn merge(&self, page_counts: &HashMap<String, usize>) {
        for (word, count) in page_counts {
            *self.counts.entry(word.clone()).or_insert(0) += *count;
        }
    }

    /// Plain snapshot of the totals, for ranking
    pub fn snapshot(&self) -> HashMap<String, usize> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Everything a single crawl invocation mutates
#[derive(Debug, Default)]
pub struct CrawlState {
    pub visited: VisitedSet,
    pub words: WordCounts,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks the accumulated counts and freezes them into a result
    ///
    /// A `popular_word_count` of 0 keeps every word; any other value
    /// truncates the ranking to that many entries.
    pub fn finish(&self, popular_word_count: usize) -> CrawlResult {
        let counts = self.words.snapshot();
        let top_n = if popular_word_count == 0 {
            counts.len()
        } else {
            popular_word_count
        };

        CrawlResult {
            word_counts: rank(&counts, top_n),
            urls_visited: self.visited.len(),
        }
    }
}
