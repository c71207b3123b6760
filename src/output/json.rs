//! JSON rendering of crawl results
//!
//! The result file mirrors the in-memory ranking: the word-count object is
//! emitted in rank order, most popular first, so the file reads top-down as
//! a leaderboard.

use crate::crawler::CrawlResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Formats a crawl result as pretty-printed JSON
///
/// # Arguments
///
/// * `result` - The crawl result to format
///
/// # Returns
///
/// * `Ok(String)` - The JSON document, without a trailing newline
/// * `Err(LexiError)` - Serialization failed
pub fn result_to_json(result: &CrawlResult) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Writes a crawl result as JSON to the given writer, newline-terminated
pub fn write_result(result: &CrawlResult, writer: &mut dyn Write) -> crate::Result<()> {
    let json = result_to_json(result)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Writes a crawl result as JSON to a file, replacing any previous content
///
/// # Arguments
///
/// * `result` - The crawl result to write
/// * `path` - Destination path; an existing file is overwritten
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the result
/// * `Err(LexiError)` - Failed to create or write the file
pub fn write_result_to_path(result: &CrawlResult, path: &Path) -> crate::Result<()> {
    let mut file = File::create(path)?;
    write_result(result, &mut file)?;
    tracing::info!("Crawl result written to {}", path.display());
    Ok(())
}
