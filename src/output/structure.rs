//! Topic-grouped viewer structure
//!
//! Builds the `structure` block of `content.json` and the `index.json`
//! summary from the normalized items of a run.

use crate::config::SiteConfig;
use crate::normalize::{NormalizedItem, Topic};
use crate::output::Manifest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fewest sections the viewer renders before substituting built-in content
pub const MIN_RENDERABLE_SECTIONS: usize = 2;

/// One topic section with its items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureSection {
    pub id: Topic,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub content: Vec<NormalizedItem>,
}

/// Navigation entry for a non-empty section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEntry {
    pub id: Topic,
    pub title: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureMetadata {
    pub generated: DateTime<Utc>,
    pub total_sections: usize,
}

/// Navigation structure consumed by the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub sections: Vec<StructureSection>,
    pub navigation: Vec<NavigationEntry>,
    pub metadata: StructureMetadata,
}

impl Structure {
    /// Groups items by topic
    ///
    /// Sections follow [`Topic::ALL`] order, items keep their production
    /// order, and topics without items are left out of both lists.
    pub fn build(items: &[NormalizedItem]) -> Self {
        let mut sections = Vec::new();
        let mut navigation = Vec::new();

        for topic in Topic::ALL {
            let content: Vec<NormalizedItem> = items
                .iter()
                .filter(|item| item.topic == topic)
                .cloned()
                .collect();

            if content.is_empty() {
                continue;
            }

            navigation.push(NavigationEntry {
                id: topic,
                title: topic.title().to_string(),
                icon: topic.icon().to_string(),
            });
            sections.push(StructureSection {
                id: topic,
                title: topic.title().to_string(),
                description: topic.description().to_string(),
                icon: topic.icon().to_string(),
                content,
            });
        }

        let total_sections = sections.len();
        Self {
            sections,
            navigation,
            metadata: StructureMetadata {
                generated: Utc::now(),
                total_sections,
            },
        }
    }

    /// Returns true if the viewer will show this structure instead of its
    /// built-in content
    pub fn is_renderable(&self) -> bool {
        self.sections.len() >= MIN_RENDERABLE_SECTIONS
    }
}

/// Contents of `content.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBundle {
    pub manifest: Manifest,
    pub content: Vec<NormalizedItem>,
    pub structure: Structure,
}

/// Per-section summary in `index.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSection {
    pub id: Topic,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub content_count: usize,
}

/// Contents of `index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteIndex {
    pub title: String,
    pub description: String,
    pub last_updated: DateTime<Utc>,
    pub sections: Vec<IndexSection>,
}

impl SiteIndex {
    pub fn from_structure(structure: &Structure, site: &SiteConfig) -> Self {
        Self {
            title: site.title.clone(),
            description: site.description.clone(),
            last_updated: Utc::now(),
            sections: structure
                .sections
                .iter()
                .map(|section| IndexSection {
                    id: section.id,
                    title: section.title.clone(),
                    description: section.description.clone(),
                    icon: section.icon.clone(),
                    content_count: section.content.len(),
                })
                .collect(),
        }
    }
}
