//! HTML page extraction
//!
//! This module turns a fetched HTML page into a [`PageDocument`]:
//! - Title (from `<title>`, falling back to the first `<h1>`)
//! - Headings `h1`..`h4` with their level
//! - Paragraphs and code blocks
//! - Links and images, resolved to absolute URLs

use crate::extract::dom::{DomQuery, ElementHandle, HtmlDocument};
use crate::url::resolve_href;
use crate::DistillError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Structured content extracted from one HTML page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    /// The page URL
    pub url: String,

    /// Page title, empty if neither `<title>` nor `<h1>` had text
    pub title: String,

    /// Headings in document order
    pub headings: Vec<Heading>,

    /// Non-empty paragraphs in document order
    pub paragraphs: Vec<String>,

    /// Non-empty `<pre>`/`<code>` contents in document order
    pub code_blocks: Vec<String>,

    /// Links with absolute URLs
    pub links: Vec<Link>,

    /// Images with absolute URLs
    pub images: Vec<Image>,

    /// When the page was extracted
    pub scraped_at: DateTime<Utc>,

    /// Label identifying where the content came from
    pub source: String,
}

/// A heading and its level (1..=4)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

/// An anchor with its absolute target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: String,
}

/// An image with its absolute source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub alt: String,
}

/// Parses HTML content and extracts a [`PageDocument`]
///
/// Malformed markup never fails extraction; a category that cannot be read
/// simply comes back empty. Input that contains no markup at all is rejected.
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `source_url` - The page URL, used to resolve relative links
/// * `source_label` - Label stored on the record
///
/// # Returns
///
/// * `Ok(PageDocument)` - Successfully extracted page
/// * `Err(DistillError::HtmlParse)` - Input is not markup
///
/// # Example
///
/// ```
/// use doc_distiller::extract::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/docs/").unwrap();
/// let page = extract_page(html, &base_url, "docs").unwrap();
/// assert_eq!(page.title, "Test");
/// assert_eq!(page.links[0].url, "https://example.com/page");
/// ```
pub fn extract_page(
    html: &str,
    source_url: &Url,
    source_label: &str,
) -> Result<PageDocument, DistillError> {
    if html.trim().is_empty() || !html.contains('<') {
        return Err(DistillError::HtmlParse {
            url: source_url.to_string(),
            message: "response body contains no markup".to_string(),
        });
    }

    let document = HtmlDocument::parse(html);
    Ok(extract_from(&document, source_url, source_label))
}

/// Extracts a [`PageDocument`] from any [`DomQuery`] implementation
pub fn extract_from<D: DomQuery>(document: &D, source_url: &Url, source_label: &str) -> PageDocument {
    PageDocument {
        url: source_url.to_string(),
        title: extract_title(document),
        headings: extract_headings(document),
        paragraphs: non_empty_texts(document, "p"),
        code_blocks: non_empty_texts(document, "pre, code"),
        links: extract_links(document, source_url),
        images: extract_images(document, source_url),
        scraped_at: Utc::now(),
        source: source_label.to_string(),
    }
}

/// Runs a query, treating an unusable selector as an empty category
fn select<D: DomQuery>(document: &D, selector: &str) -> Vec<ElementHandle> {
    document.query_all(selector).unwrap_or_else(|e| {
        tracing::warn!("Selector '{}' could not be evaluated: {}", selector, e);
        Vec::new()
    })
}

fn first_text<D: DomQuery>(document: &D, selector: &str) -> Option<String> {
    select(document, selector)
        .first()
        .map(|element| element.text().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `<title>` text, else first `<h1>` text, else empty
fn extract_title<D: DomQuery>(document: &D) -> String {
    first_text(document, "title")
        .or_else(|| first_text(document, "h1"))
        .unwrap_or_default()
}

fn extract_headings<D: DomQuery>(document: &D) -> Vec<Heading> {
    select(document, "h1, h2, h3, h4")
        .into_iter()
        .filter_map(|element| {
            let level = element.name().strip_prefix('h')?.parse::<u8>().ok()?;
            let text = element.text().trim();
            (!text.is_empty()).then(|| Heading {
                level,
                text: text.to_string(),
            })
        })
        .collect()
}

fn non_empty_texts<D: DomQuery>(document: &D, selector: &str) -> Vec<String> {
    select(document, selector)
        .into_iter()
        .map(|element| element.text().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Resolves a URL-bearing attribute, skipping missing, empty or unresolvable values
fn resolved_attr(element: &ElementHandle, attr: &str, base_url: &Url) -> Option<String> {
    let value = element.attr(attr)?.trim();
    if value.is_empty() {
        return None;
    }

    match resolve_href(value, base_url) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Skipping {}: {}", attr, e);
            None
        }
    }
}

fn extract_links<D: DomQuery>(document: &D, base_url: &Url) -> Vec<Link> {
    select(document, "a")
        .iter()
        .filter_map(|element| {
            resolved_attr(element, "href", base_url).map(|url| Link {
                url,
                text: element.text().trim().to_string(),
            })
        })
        .collect()
}

fn extract_images<D: DomQuery>(document: &D, base_url: &Url) -> Vec<Image> {
    select(document, "img")
        .iter()
        .filter_map(|element| {
            resolved_attr(element, "src", base_url).map(|url| Image {
                url,
                alt: element.attr("alt").unwrap_or_default().to_string(),
            })
        })
        .collect()
}
