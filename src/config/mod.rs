//! Configuration module for Sitesift
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file. Every option is a typed field; validation runs once at startup.
//!
//! # Example
//!
//! ```no_run
//! use sitesift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Request timeout: {} minutes", config.crawler.request_timeout_minutes);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, ExtractorConfig, ProjectConfig, StoreConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
