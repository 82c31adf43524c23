//! Doc-Distiller: a documentation scraping and simplification pipeline
//!
//! This crate scrapes a documentation page and its linked PDFs, extracts
//! structured content, rewrites it through a language model (with a
//! deterministic markdown fallback), and groups the result by topic for a
//! static documentation viewer.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Doc-Distiller operations
#[derive(Debug, Error)]
pub enum DistillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error for {url} after {attempts} attempt(s): {message}")]
    Network {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("HTML parse error for {url}: {message}")]
    HtmlParse { url: String, message: String },

    #[error("PDF parse error for {name}: {message}")]
    PdfParse { name: String, message: String },

    #[error("Unexpected content in {path}: {message}")]
    Shape { path: String, message: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

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

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to resolve '{href}' against {base}")]
    Unresolvable { href: String, base: String },

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Doc-Distiller operations
pub type Result<T> = std::result::Result<T, DistillError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{PageDocument, PdfExtraction, PdfSection};
pub use normalize::{NormalizedItem, Normalizer, Topic};
pub use output::{Manifest, ResourceRecord, RunSummary, Structure};
pub use url::{extract_domain, resolve_href};
