//! Content extraction module
//!
//! This module turns fetched resources into structured records:
//! - HTML pages into [`PageDocument`]s
//! - PDF bytes into [`PdfExtraction`]s and heuristic [`PdfSection`]s

pub mod dom;
mod page;
mod pdf;

pub use dom::{DomQuery, ElementHandle, HtmlDocument};
pub use page::{extract_from, extract_page, Heading, Image, Link, PageDocument};
pub use pdf::{
    extract_pdf, extract_pdf_file, is_section_title, parse_pdf, segment, PdfExtraction,
    PdfMetadata, PdfSection,
};
