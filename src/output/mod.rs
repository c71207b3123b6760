//! Output module for rendering crawl results
//!
//! Renders the final [`CrawlResult`](crate::crawler::CrawlResult) as JSON,
//! either to a writer (stdout in the CLI) or to a file. Result files are
//! replaced on every run; the profiling report, which appends instead, is
//! written by the profiler itself.

mod json;

pub use json::{result_to_json, write_result, write_result_to_path};
