//! Configuration module for Doc-Distiller
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use doc_distiller::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("distiller.toml")).unwrap();
//! println!("Scraping from: {}", config.scraper.main_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, LlmConfig, NormalizerConfig, OutputConfig, ScraperConfig, SiteConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
