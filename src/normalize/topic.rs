//! Keyword-based topic classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// Viewer topic a normalized item is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    GettingStarted,
    CoreConcepts,
    Widgets,
    DataSources,
    ActionsTriggers,
    Deployment,
    Humanitarian,
}

/// Keyword rules, checked in order; the first rule with a hit wins
const RULES: &[(Topic, &[&str])] = &[
    (Topic::GettingStarted, &["getting started", "introduction", "basics"]),
    (Topic::Widgets, &["widget"]),
    (Topic::DataSources, &["data", "source", "layer"]),
    (Topic::ActionsTriggers, &["action", "trigger", "event"]),
    (Topic::Deployment, &["deploy", "publish", "share"]),
    (
        Topic::Humanitarian,
        &["humanitarian", "disaster", "emergency", "red cross"],
    ),
];

impl Topic {
    /// All topics in viewer order
    pub const ALL: [Topic; 7] = [
        Topic::GettingStarted,
        Topic::CoreConcepts,
        Topic::Widgets,
        Topic::DataSources,
        Topic::ActionsTriggers,
        Topic::Deployment,
        Topic::Humanitarian,
    ];

    /// Classifies rendered content by case-insensitive keyword match
    ///
    /// Falls back to [`Topic::CoreConcepts`] when nothing matches.
    pub fn classify(content: &str) -> Topic {
        let lower = content.to_lowercase();
        RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::CoreConcepts)
    }

    /// Stable identifier used in the viewer
    pub fn id(self) -> &'static str {
        match self {
            Topic::GettingStarted => "getting-started",
            Topic::CoreConcepts => "core-concepts",
            Topic::Widgets => "widgets",
            Topic::DataSources => "data-sources",
            Topic::ActionsTriggers => "actions-triggers",
            Topic::Deployment => "deployment",
            Topic::Humanitarian => "humanitarian",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Topic::GettingStarted => "Getting Started",
            Topic::CoreConcepts => "Core Concepts",
            Topic::Widgets => "Widgets & Components",
            Topic::DataSources => "Data Sources",
            Topic::ActionsTriggers => "Actions & Triggers",
            Topic::Deployment => "Deployment",
            Topic::Humanitarian => "Humanitarian Use Cases",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Topic::GettingStarted => "Begin your journey with the documentation",
            Topic::CoreConcepts => "Understand the fundamental building blocks",
            Topic::Widgets => "Learn about available widgets and how to use them",
            Topic::DataSources => "Connect and manage your data",
            Topic::ActionsTriggers => "Create interactive experiences",
            Topic::Deployment => "Share your applications with the world",
            Topic::Humanitarian => "Real-world applications for disaster response",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Topic::GettingStarted => "🚀",
            Topic::CoreConcepts => "📚",
            Topic::Widgets => "🧩",
            Topic::DataSources => "📊",
            Topic::ActionsTriggers => "⚡",
            Topic::Deployment => "🌐",
            Topic::Humanitarian => "🏥",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_core_concepts() {
        assert_eq!(Topic::classify("Nothing to see here"), Topic::CoreConcepts);
        assert_eq!(Topic::classify(""), Topic::CoreConcepts);
    }

    #[test]
    fn test_first_rule_wins() {
        assert_eq!(
            Topic::classify("A widget for humanitarian response"),
            Topic::Widgets
        );
        assert_eq!(
            Topic::classify("Introduction to widgets"),
            Topic::GettingStarted
        );
        assert_eq!(
            Topic::classify("Deploy your data layer"),
            Topic::DataSources
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Topic::classify("# GETTING STARTED"), Topic::GettingStarted);
        assert_eq!(Topic::classify("Red Cross field teams"), Topic::Humanitarian);
        assert_eq!(Topic::classify("On click, fire a TRIGGER"), Topic::ActionsTriggers);
        assert_eq!(Topic::classify("Publish the app"), Topic::Deployment);
    }

    #[test]
    fn test_serde_uses_ids() {
        for topic in Topic::ALL {
            let json = serde_json::to_string(&topic).unwrap();
            assert_eq!(json, format!("\"{}\"", topic.id()));
        }
    }

    #[test]
    fn test_all_is_in_viewer_order() {
        let mut sorted = Topic::ALL;
        sorted.sort();
        assert_eq!(sorted, Topic::ALL);
    }
}
