//! URL handling module for Doc-Distiller
//!
//! This module provides domain extraction, href resolution against a page URL,
//! and the link predicates used to discover PDFs and related pages.

mod domain;
mod resolve;

// Re-export main functions
pub use domain::extract_domain;
pub use resolve::{has_scheme, resolve_href};

/// Returns true if the URL points at a PDF document
///
/// Matches on the literal suffix, so `guide.pdf?download=1` does not qualify.
pub fn is_pdf_link(url: &str) -> bool {
    url.ends_with(".pdf")
}

/// Returns true if the URL qualifies as a related page of `domain`
///
/// A related page is an http(s) URL that contains the domain anywhere, is
/// not a PDF, and carries no fragment marker.
pub fn is_related_page(url: &str, domain: &str) -> bool {
    is_web_url(url) && url.contains(domain) && !is_pdf_link(url) && !url.contains('#')
}

fn is_web_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
