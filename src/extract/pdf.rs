//! PDF extraction and section segmentation
//!
//! Text comes from `pdf-extract`; page count, version and the Info dictionary
//! come from `lopdf`. Both libraries are synchronous and `pdf-extract` can
//! panic on unusual documents, so extraction runs on the blocking pool where a
//! panic surfaces as a join error instead of taking the run down.

use crate::DistillError;
use lopdf::{Document, Object};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Lines longer than this are never section titles
const MAX_TITLE_CHARS: usize = 49;

/// Lines shorter than this are never section titles
const MIN_TITLE_CHARS: usize = 4;

/// Everything extracted from one PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfExtraction {
    /// Full document text
    pub text: String,

    /// Number of pages in the page tree
    pub page_count: usize,

    /// Document-level facts
    pub metadata: PdfMetadata,

    /// Info dictionary entries (Title, Author, Producer, ...)
    pub info: BTreeMap<String, String>,
}

/// Document-level facts about a PDF
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMetadata {
    pub version: String,
    pub object_count: usize,
    pub encrypted: bool,
}

/// One heuristically delimited region of PDF text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfSection {
    pub title: String,
    pub content: Vec<String>,
}

impl PdfSection {
    fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content: Vec::new(),
        }
    }
}

/// Extracts text and metadata from PDF bytes on the blocking pool
///
/// # Arguments
///
/// * `name` - Display name used in errors (usually the file name)
/// * `bytes` - Raw PDF content
///
/// # Returns
///
/// * `Ok(PdfExtraction)` - Successfully parsed document
/// * `Err(DistillError::PdfParse)` - Bytes are not a readable PDF
pub async fn extract_pdf(name: &str, bytes: Vec<u8>) -> Result<PdfExtraction, DistillError> {
    let outcome = tokio::task::spawn_blocking(move || parse_pdf(&bytes)).await;

    match outcome {
        Ok(Ok(extraction)) => Ok(extraction),
        Ok(Err(message)) => Err(DistillError::PdfParse {
            name: name.to_string(),
            message,
        }),
        Err(e) => Err(DistillError::PdfParse {
            name: name.to_string(),
            message: format!("PDF library aborted: {}", e),
        }),
    }
}

/// Reads a PDF from disk and extracts it
pub async fn extract_pdf_file(path: &Path) -> Result<PdfExtraction, DistillError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    extract_pdf(&name, bytes).await
}

/// Synchronous extraction; structural parse first so garbage fails fast
pub fn parse_pdf(bytes: &[u8]) -> Result<PdfExtraction, String> {
    let document = Document::load_mem(bytes).map_err(|e| format!("invalid PDF: {}", e))?;
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| format!("text extraction failed: {}", e))?;

    Ok(PdfExtraction {
        text,
        page_count: document.get_pages().len(),
        metadata: PdfMetadata {
            version: document.version.clone(),
            object_count: document.objects.len(),
            encrypted: document.is_encrypted(),
        },
        info: read_info(&document),
    })
}

/// Follows a reference if `object` is one
fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn read_info(document: &Document) -> BTreeMap<String, String> {
    let Some(info) = document
        .trailer
        .get(b"Info")
        .ok()
        .and_then(|object| resolve(document, object))
        .and_then(|object| object.as_dict().ok())
    else {
        return BTreeMap::new();
    };

    info.iter()
        .filter_map(|(key, value)| {
            let value = match resolve(document, value)? {
                Object::String(bytes, _) => decode_pdf_string(bytes),
                Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                Object::Integer(i) => i.to_string(),
                Object::Real(r) => r.to_string(),
                Object::Boolean(b) => b.to_string(),
                _ => return None,
            };
            Some((String::from_utf8_lossy(key).into_owned(), value))
        })
        .collect()
}

/// Decodes a PDF text string (UTF-16BE with BOM, otherwise byte-per-char)
fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Returns true if a trimmed line reads as a section title
///
/// A title is upper-case (equal to its own upper-casing, so digits and
/// punctuation pass) and 4 to 49 characters long. This is a heuristic:
/// OCR noise and inconsistent casing in real PDFs will misfire.
pub fn is_section_title(line: &str) -> bool {
    let len = line.chars().count();
    (MIN_TITLE_CHARS..=MAX_TITLE_CHARS).contains(&len) && line == line.to_uppercase()
}

/// Splits PDF text into titled sections
///
/// Non-empty lines accumulate under the most recent title. A section is only
/// emitted once it has content, so consecutive titles collapse into the last
/// one. Content before the first title lands in a section with an empty title.
///
/// # Example
///
/// ```
/// use doc_distiller::extract::segment;
///
/// let sections = segment("TITLE ONE\nfoo\nbar\nTITLE TWO\nbaz");
/// assert_eq!(sections.len(), 2);
/// assert_eq!(sections[0].title, "TITLE ONE");
/// assert_eq!(sections[0].content, vec!["foo", "bar"]);
/// ```
pub fn segment(text: &str) -> Vec<PdfSection> {
    let mut sections = Vec::new();
    let mut current = PdfSection::titled("");

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_section_title(line) {
            let finished = std::mem::replace(&mut current, PdfSection::titled(line));
            if !finished.content.is_empty() {
                sections.push(finished);
            }
        } else {
            current.content.push(line.to_string());
        }
    }

    if !current.content.is_empty() {
        sections.push(current);
    }

    sections
}
