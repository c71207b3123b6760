//! Lexicrawl: a deadline-bounded word-frequency crawler
//!
//! This crate implements a concurrent web crawler that follows links up to a
//! configured depth and wall-clock deadline, ranks the words it encounters,
//! and reports how much time was spent inside each profiled operation.

pub mod config;
pub mod crawler;
pub mod output;
pub mod parser;
pub mod profiler;
pub mod ranking;

use thiserror::Error;

/// Main error type for Lexicrawl operations
#[derive(Debug, Error)]
pub enum LexiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Profiler error: {0}")]
    Profiler(#[from] ProfilerError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unknown implementation override: {0:?}")]
    UnknownImplementation(String),

    #[error("Implementation {name:?} supports parallelism up to {supported}, but {requested} was requested")]
    UnsatisfiableOverride {
        name: String,
        supported: usize,
        requested: usize,
    },
}

/// Profiler-specific errors
#[derive(Debug, Error)]
pub enum ProfilerError {
    #[error("{0} declares no profiled operations")]
    NoProfiledOperations(&'static str),
}

/// Result type alias for Lexicrawl operations
pub type Result<T> = std::result::Result<T, LexiError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for profiler operations
pub type ProfilerResult<T> = std::result::Result<T, ProfilerError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{build_engine, CrawlEngine, CrawlResult};
pub use parser::{LivePageParser, PageParser, ParsedPage};
pub use profiler::{Profiler, ProfilingLedger};
pub use ranking::rank;
