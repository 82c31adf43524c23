//! Resource discovery from an extracted main page

use crate::extract::Link;
use crate::url::{is_pdf_link, is_related_page};

/// A PDF found on the main page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfLink {
    /// Absolute URL of the document
    pub url: String,
    /// Local file name, usually the last path segment
    pub name: String,
}

/// Returns every link ending in `.pdf`, in document order
pub fn discover_pdfs(links: &[Link]) -> Vec<PdfLink> {
    links
        .iter()
        .filter(|link| is_pdf_link(&link.url))
        .map(|link| PdfLink {
            url: link.url.clone(),
            name: pdf_file_name(&link.url),
        })
        .collect()
}

/// Returns up to `cap` related page URLs, in document order
///
/// # Arguments
///
/// * `links` - Links of the main page
/// * `domain` - Substring a related URL must contain
/// * `cap` - Maximum number of pages returned
pub fn discover_related(links: &[Link], domain: &str, cap: usize) -> Vec<String> {
    links
        .iter()
        .filter(|link| is_related_page(&link.url, domain))
        .map(|link| link.url.clone())
        .take(cap)
        .collect()
}

/// Local file name for a PDF URL
///
/// The text after the last `/` of the whole URL, so a query-only link such as
/// `?file=guide.pdf` still gets a name. Characters that are unsafe in file
/// names become `_`.
fn pdf_file_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).chars().map(safe_char).collect()
}

fn safe_char(c: char) -> char {
    if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '%') {
        c
    } else {
        '_'
    }
}
