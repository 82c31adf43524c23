//! Run statistics
//!
//! This module collects the counts reported at the end of a run and prints
//! them to stdout.

use crate::normalize::{NormalizedItem, Strategy};
use crate::output::{Manifest, Structure};

/// Summary of one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages scraped (main page plus related pages)
    pub pages_scraped: usize,

    /// Related pages that could not be scraped
    pub related_failed: usize,

    /// PDFs downloaded and extracted
    pub pdfs_processed: usize,

    /// PDFs recorded with `processed: false`
    pub pdfs_failed: usize,

    /// Items rewritten by the language model
    pub items_generated: usize,

    /// Items rendered by the fallback
    pub items_fallback: usize,

    /// Topic sections in the viewer structure
    pub sections_built: usize,

    /// Whether the viewer will show the structure
    pub renderable: bool,
}

impl RunSummary {
    /// Derives the summary from a run's outputs
    pub fn collect(
        manifest: &Manifest,
        items: &[NormalizedItem],
        structure: &Structure,
        related_failed: usize,
    ) -> Self {
        let pdfs_processed = manifest.processed_resources().count();
        let items_generated = items
            .iter()
            .filter(|item| item.strategy == Strategy::Generated)
            .count();

        Self {
            pages_scraped: manifest.content.len(),
            related_failed,
            pdfs_processed,
            pdfs_failed: manifest.resources.len() - pdfs_processed,
            items_generated,
            items_fallback: items.len() - items_generated,
            sections_built: structure.sections.len(),
            renderable: structure.is_renderable(),
        }
    }

    /// Total normalized items
    pub fn items_total(&self) -> usize {
        self.items_generated + self.items_fallback
    }
}

/// Prints a run summary to stdout in a formatted manner
///
/// # Arguments
///
/// * `summary` - The summary to display
pub fn print_summary(summary: &RunSummary) {
    println!("=== Run Summary ===\n");

    println!("Scraping:");
    println!("  Pages scraped: {}", summary.pages_scraped);
    if summary.related_failed > 0 {
        println!("  Related pages failed: {}", summary.related_failed);
    }
    println!(
        "  PDFs processed: {} ({} failed)",
        summary.pdfs_processed, summary.pdfs_failed
    );
    println!();

    println!("Normalization:");
    println!("  Content pieces: {}", summary.items_total());
    println!("  Language model: {}", summary.items_generated);
    println!("  Fallback: {}", summary.items_fallback);
    println!();

    println!("Website sections: {}", summary.sections_built);
    if !summary.renderable {
        println!("  (fewer than 2 sections; the viewer will show its built-in content)");
    }
}
