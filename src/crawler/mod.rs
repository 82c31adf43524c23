//! Crawler module for documentation fetching and run orchestration
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with retry logic and streaming downloads
//! - Run-wide request pacing
//! - PDF and related-page discovery
//! - Overall run coordination

mod coordinator;
mod discovery;
mod fetcher;
mod pacer;

pub use coordinator::{run_pipeline, run_reprocess, Coordinator};
pub use discovery::{discover_pdfs, discover_related, PdfLink};
pub use fetcher::{build_http_client, FetchBody, FetchKind, FetchResult, Fetcher, RetryPolicy};
pub use pacer::Pacer;
