//! Content normalization module
//!
//! This module turns extracted records into viewer-ready markdown:
//! - Rewriting through a language model when one is configured
//! - A deterministic markdown fallback otherwise, or when the model fails
//! - Keyword-based topic classification of the result

pub mod fallback;
mod llm;
mod topic;

pub use llm::{build_instruction, CollaboratorError, GenerationRequest, OpenAiGenerator, TextGenerator};
pub use topic::Topic;

use crate::config::LlmConfig;
use crate::extract::{PageDocument, PdfSection};
use crate::DistillError;
use serde::{Deserialize, Serialize};

/// Record handed to the normalizer
#[derive(Debug, Clone, Copy)]
pub enum SourceContent<'a> {
    Page(&'a PageDocument),
    Section(&'a PdfSection),
}

/// What the model sees for a PDF section
#[derive(Serialize)]
struct SectionPrompt<'a> {
    title: &'a str,
    paragraphs: &'a [String],
}

impl SourceContent<'_> {
    /// Pretty-printed JSON embedded in the instruction
    fn to_prompt_json(&self) -> Result<String, serde_json::Error> {
        match self {
            SourceContent::Page(page) => serde_json::to_string_pretty(page),
            SourceContent::Section(section) => serde_json::to_string_pretty(&SectionPrompt {
                title: &section.title,
                paragraphs: &section.content,
            }),
        }
    }
}

/// How an item's content was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Generated,
    Fallback,
}

/// One rewritten content unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedItem {
    /// `section-<n>` in production order
    pub id: String,
    /// Markdown body
    pub content: String,
    pub strategy: Strategy,
    pub topic: Topic,
}

/// Identifier of the `index`-th normalized item of a run
pub fn item_id(index: usize) -> String {
    format!("section-{}", index)
}

/// Model settings attached to every generation request
#[derive(Debug, Clone, PartialEq)]
struct ModelSettings {
    model: String,
    max_tokens: u32,
    temperature: f32,
}

/// Rewrites extracted content, falling back to deterministic markdown
pub struct Normalizer {
    generator: Option<Box<dyn TextGenerator>>,
    settings: ModelSettings,
}

impl Normalizer {
    /// A normalizer that never calls a model
    pub fn fallback_only() -> Self {
        let defaults = LlmConfig::default();
        Self {
            generator: None,
            settings: ModelSettings {
                model: defaults.model,
                max_tokens: defaults.max_tokens,
                temperature: defaults.temperature,
            },
        }
    }

    /// A normalizer backed by the given generator
    pub fn with_generator(generator: Box<dyn TextGenerator>, config: &LlmConfig) -> Self {
        Self {
            generator: Some(generator),
            settings: ModelSettings {
                model: config.model.clone(),
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
        }
    }

    /// Builds a normalizer from configuration and the environment
    ///
    /// The model is used only when `[llm] enabled` is set and the API key
    /// variable named by `api-key-env` is present and non-empty.
    pub fn from_config(config: &LlmConfig) -> Result<Self, DistillError> {
        if !config.enabled {
            tracing::info!("Language model disabled; using fallback rendering");
            return Ok(Self::fallback_only());
        }

        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => {
                let generator = OpenAiGenerator::new(config, key)?;
                tracing::info!("Using language model '{}' for normalization", config.model);
                Ok(Self::with_generator(Box::new(generator), config))
            }
            _ => {
                tracing::info!(
                    "No API key in ${}; using fallback rendering",
                    config.api_key_env
                );
                Ok(Self::fallback_only())
            }
        }
    }

    /// Returns true if a model is consulted before falling back
    pub fn uses_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Normalizes one page or PDF section
    ///
    /// Never fails: any collaborator error is logged and the fallback
    /// rendering is used instead.
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier for the produced item
    /// * `source` - The record to normalize
    pub async fn normalize(&self, id: String, source: SourceContent<'_>) -> NormalizedItem {
        let (content, strategy) = match self.generate(&source).await {
            Some(text) => (text, Strategy::Generated),
            None => (fallback::render(&source), Strategy::Fallback),
        };

        let topic = Topic::classify(&content);
        tracing::debug!("{} normalized ({:?}) as {}", id, strategy, topic);

        NormalizedItem {
            id,
            content,
            strategy,
            topic,
        }
    }

    async fn generate(&self, source: &SourceContent<'_>) -> Option<String> {
        let generator = self.generator.as_ref()?;

        let source_json = match source.to_prompt_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Could not serialize content for the model: {}", e);
                return None;
            }
        };

        let request = GenerationRequest {
            model: self.settings.model.clone(),
            instruction: build_instruction(&source_json),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match generator.generate(&request).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Language model failed, using fallback: {}", e);
                None
            }
        }
    }
}
