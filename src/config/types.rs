use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

use crate::ConfigResult;

/// Main configuration structure for a crawl
///
/// Deserialized from a JSON file with camelCase keys. Only `startPages` is
/// required; every other field falls back to a documented default. The
/// configuration is immutable once loaded, and validation happens in a
/// separate pass right after deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlConfig {
    /// URLs the crawl starts from, in order. Duplicates are allowed in the
    /// file and removed before use (first occurrence wins).
    pub start_pages: Vec<String>,

    /// Regex patterns for URLs that must never be visited; a pattern only
    /// applies when it matches the whole URL
    #[serde(default)]
    pub ignored_urls: Vec<String>,

    /// Regex patterns for words to exclude from counting, matched in full
    /// against the raw whitespace-delimited token before any normalization
    #[serde(default)]
    pub ignored_words: Vec<String>,

    /// Maximum link depth from the starting pages; 0 visits nothing
    #[serde(default)]
    pub max_depth: u32,

    /// Wall-clock budget for the whole crawl, in seconds; must be at least 1
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Number of ranked words to keep in the result; 0 keeps every word
    #[serde(default)]
    pub popular_word_count: usize,

    /// Desired parallelism; any value below 1 means "use the hardware
    /// parallelism of this machine"
    #[serde(default = "default_parallelism")]
    pub parallelism: i32,

    /// Forces a specific engine ("sequential" or "parallel"); empty selects
    /// automatically based on parallelism
    #[serde(default)]
    pub implementation_override: String,

    /// File the crawl result is written to (replaced each run); empty writes
    /// to stdout
    #[serde(default)]
    pub result_path: String,

    /// File the profiling report is appended to; empty writes to stdout
    #[serde(default)]
    pub profile_output_path: String,
}

fn default_timeout_seconds() -> u64 {
    1
}

fn default_parallelism() -> i32 {
    -1
}

impl CrawlConfig {
    /// Returns the starting pages with duplicates removed, preserving the
    /// order of first occurrence.
    pub fn unique_start_pages(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.start_pages
            .iter()
            .filter(|url| seen.insert(url.as_str()))
            .cloned()
            .collect()
    }

    /// Returns the crawl timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Resolves the desired parallelism to a concrete target.
    ///
    /// Values below 1 mean "auto" and resolve to the hardware parallelism of
    /// the current machine.
    pub fn target_parallelism(&self) -> usize {
        if self.parallelism >= 1 {
            self.parallelism as usize
        } else {
            num_cpus::get()
        }
    }

    /// Compiles the ignored-URL patterns.
    pub fn ignored_url_patterns(&self) -> ConfigResult<Vec<Regex>> {
        compile_patterns(&self.ignored_urls)
    }

    /// Compiles the ignored-word patterns.
    pub fn ignored_word_patterns(&self) -> ConfigResult<Vec<Regex>> {
        compile_patterns(&self.ignored_words)
    }
}

/// Compiles a list of regex patterns, reporting the first one that fails
///
/// A pattern must match its candidate in full: `the` filters the word `the`
/// but not `theater`, and a URL is only ignored when the whole URL matches.
/// Anchoring happens here so every match site stays a plain `is_match`.
pub(crate) fn compile_patterns(patterns: &[String]) -> ConfigResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                crate::ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                }
            })
        })
        .collect()
}
