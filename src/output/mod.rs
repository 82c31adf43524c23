//! Output module for run artifacts and summaries
//!
//! This module handles:
//! - The run manifest and its resource records
//! - Grouping normalized content into the viewer structure
//! - Writing JSON artifacts atomically
//! - Recording run statistics

pub mod artifacts;
mod manifest;
pub mod stats;
mod structure;

pub use artifacts::{read_json, write_json_atomic, PageFileNamer};
pub use manifest::{Manifest, ManifestEntry, PendingResource, ResourceKind, ResourceRecord};
pub use stats::{print_summary, RunSummary};
pub use structure::{
    ContentBundle, IndexSection, NavigationEntry, SiteIndex, Structure, StructureMetadata,
    StructureSection, MIN_RENDERABLE_SECTIONS,
};
