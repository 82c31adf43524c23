//! Run manifest and resource records
//!
//! A [`ResourceRecord`] starts life as a [`PendingResource`] and is finalized
//! exactly once, by [`PendingResource::succeeded`] or [`PendingResource::failed`].
//! Finalized records expose no mutators.

use crate::extract::PageDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;

/// Kind of downloaded asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Pdf,
}

/// A discovered resource that has not finished processing
#[derive(Debug)]
#[must_use = "a pending resource must be finalized with succeeded() or failed()"]
pub struct PendingResource {
    kind: ResourceKind,
    name: String,
    url: String,
}

impl PendingResource {
    /// Name of the resource (its local file name)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Finalizes the record as processed, stored at `local_path`
    pub fn succeeded(self, local_path: &Path) -> ResourceRecord {
        ResourceRecord {
            kind: self.kind,
            name: self.name,
            url: self.url,
            local_path: Some(local_path.display().to_string()),
            processed: true,
            error: None,
        }
    }

    /// Finalizes the record as failed with `error`
    pub fn failed(self, error: impl Display) -> ResourceRecord {
        ResourceRecord {
            kind: self.kind,
            name: self.name,
            url: self.url,
            local_path: None,
            processed: false,
            error: Some(error.to_string()),
        }
    }
}

/// Manifest entry describing one downloaded asset and its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    #[serde(rename = "type")]
    kind: ResourceKind,
    name: String,
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_path: Option<String>,
    processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ResourceRecord {
    /// Starts a record for a discovered PDF
    pub fn pending(name: impl Into<String>, url: impl Into<String>) -> PendingResource {
        PendingResource {
            kind: ResourceKind::Pdf,
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn local_path(&self) -> Option<&str> {
        self.local_path.as_deref()
    }

    pub fn processed(&self) -> bool {
        self.processed
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Content listed in the manifest: the main page inline, related pages by file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManifestEntry {
    Page(Box<PageDocument>),
    Reference { url: String, file: String },
}

/// Durable record of one scrape run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub main_url: String,
    /// When the run started
    pub scraped: DateTime<Utc>,
    pub content: Vec<ManifestEntry>,
    pub resources: Vec<ResourceRecord>,
}

impl Manifest {
    /// Starts an empty manifest for `main_url`
    pub fn new(main_url: impl Into<String>) -> Self {
        Self {
            main_url: main_url.into(),
            scraped: Utc::now(),
            content: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Records the main page inline
    pub fn push_page(&mut self, page: PageDocument) {
        self.content.push(ManifestEntry::Page(Box::new(page)));
    }

    /// Records a related page saved to `file`
    pub fn push_reference(&mut self, url: impl Into<String>, file: impl Into<String>) {
        self.content.push(ManifestEntry::Reference {
            url: url.into(),
            file: file.into(),
        });
    }

    /// Records a finalized resource
    pub fn push_resource(&mut self, record: ResourceRecord) {
        self.resources.push(record);
    }

    /// Resources that were processed successfully
    pub fn processed_resources(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.resources.iter().filter(|r| r.processed)
    }

    /// Files of related pages, in the order they were scraped
    pub fn referenced_files(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|entry| match entry {
            ManifestEntry::Reference { file, .. } => Some(file.as_str()),
            ManifestEntry::Page(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_succeeded_record() {
        let record = ResourceRecord::pending("guide.pdf", "https://x.com/guide.pdf")
            .succeeded(Path::new("data/raw/guide.pdf"));

        assert!(record.processed());
        assert_eq!(record.error(), None);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "type": "pdf",
                "name": "guide.pdf",
                "url": "https://x.com/guide.pdf",
                "localPath": "data/raw/guide.pdf",
                "processed": true
            })
        );
    }

    #[test]
    fn test_failed_record() {
        let record = ResourceRecord::pending("bad.pdf", "https://x.com/bad.pdf").failed("HTTP 404");

        assert!(!record.processed());
        assert_eq!(record.local_path(), None);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["error"], "HTTP 404");
        assert_eq!(value["processed"], false);
        assert!(value.get("localPath").is_none());
    }

    #[test]
    fn test_reference_entry_round_trips_as_reference() {
        let mut manifest = Manifest::new("https://x.com/");
        manifest.push_reference("https://x.com/a", "page-1.json");

        let json = serde_json::to_string(&manifest).unwrap();
        let back: Manifest = serde_json::from_str(&json).unwrap();

        assert_eq!(back.content.len(), 1);
        assert!(matches!(back.content[0], ManifestEntry::Reference { .. }));
        assert_eq!(back.referenced_files().collect::<Vec<_>>(), vec!["page-1.json"]);
    }

    #[test]
    fn test_processed_resources() {
        let mut manifest = Manifest::new("https://x.com/");
        manifest.push_resource(ResourceRecord::pending("a.pdf", "u").failed("boom"));
        manifest.push_resource(ResourceRecord::pending("b.pdf", "u").succeeded(Path::new("b.pdf")));

        let names: Vec<_> = manifest.processed_resources().map(|r| r.name()).collect();
        assert_eq!(names, vec!["b.pdf"]);
    }
}
