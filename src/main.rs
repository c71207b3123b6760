//! Lexicrawl main entry point
//!
//! This is the command-line interface for the lexicrawl word-frequency
//! crawler.

use anyhow::Context;
use clap::Parser;
use lexicrawl::config::{load_config, CrawlConfig};
use lexicrawl::crawler::build_engine;
use lexicrawl::output::{write_result, write_result_to_path};
use lexicrawl::parser::LivePageParser;
use lexicrawl::profiler::Profiler;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Lexicrawl: a parallel word-frequency crawler
///
/// Lexicrawl visits a bounded neighborhood of the web starting from the
/// configured pages, counts the words it finds, and reports the most
/// popular ones together with how many pages were visited and where the
/// crawl spent its time.
#[derive(Parser, Debug)]
#[command(name = "lexicrawl")]
#[command(version = "1.0.0")]
#[command(about = "A parallel word-frequency crawler", long_about = None)]
struct Cli {
    /// Path to JSON configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match run(config).await {
        Ok(()) => {
            tracing::info!("Crawl completed successfully");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexicrawl=info,warn"),
            1 => EnvFilter::new("lexicrawl=debug,info"),
            2 => EnvFilter::new("lexicrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Runs the configured crawl, then renders the result and profiling report
///
/// The result goes to `resultPath` (replacing the file) or stdout when the
/// path is empty; the profiling report goes to `profileOutputPath`
/// (appending) or stdout likewise.
async fn run(config: CrawlConfig) -> anyhow::Result<()> {
    let profiler = Profiler::new();

    let parser = LivePageParser::new(config.timeout(), config.ignored_word_patterns()?)?;
    let parser = Arc::new(profiler.wrap_parser(parser)?);

    let engine = build_engine(&config, parser, &profiler)?;

    let start_pages = config.unique_start_pages();
    tracing::info!(
        "Crawl configured: {} start page(s), max depth {}, timeout {}s",
        start_pages.len(),
        config.max_depth,
        config.timeout_seconds
    );

    let result = engine.crawl(&start_pages).await;

    if config.result_path.is_empty() {
        let stdout = std::io::stdout();
        write_result(&result, &mut stdout.lock())?;
    } else {
        write_result_to_path(&result, Path::new(&config.result_path))
            .with_context(|| format!("failed to write crawl result to {}", config.result_path))?;
    }

    if config.profile_output_path.is_empty() {
        let stdout = std::io::stdout();
        profiler.write_report(&mut stdout.lock())?;
    } else {
        profiler
            .write_report_to_path(Path::new(&config.profile_output_path))
            .with_context(|| {
                format!(
                    "failed to write profiling report to {}",
                    config.profile_output_path
                )
            })?;
    }

    Ok(())
}
