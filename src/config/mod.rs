//! Configuration module for Lexicrawl
//!
//! This module handles loading, parsing, and validating JSON crawl
//! configuration files.
//!
//! # Example
//!
//! ```no_run
//! use lexicrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.json")).unwrap();
//! println!("Crawler will use max depth: {}", config.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::CrawlConfig;

// Re-export parser functions
pub use parser::load_config;
pub use validation::validate;
