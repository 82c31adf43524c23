use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Doc-Distiller
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub site: SiteConfig,
}

/// Scraping and request pacing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Documentation page the run starts from
    #[serde(rename = "main-url")]
    pub main_url: String,

    /// Minimum time between the start of any two outbound requests (milliseconds)
    #[serde(rename = "pacing-delay", default = "default_pacing_delay")]
    pub pacing_delay: u64,

    /// Number of retries after the first failed attempt
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Base retry delay; each retry waits twice this (milliseconds)
    #[serde(rename = "retry-base-delay", default = "default_retry_base_delay")]
    pub retry_base_delay: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout", default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Maximum number of related pages scraped per run
    #[serde(rename = "max-related-pages", default = "default_max_related_pages")]
    pub max_related_pages: usize,

    /// Domain substring a link must contain to count as a related page.
    /// Defaults to the host of `main-url`.
    #[serde(rename = "related-domain", default)]
    pub related_domain: Option<String>,

    /// Label stored in every scraped page record
    #[serde(rename = "source-label", default = "default_source_label")]
    pub source_label: String,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the scraper
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output directory configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory for raw scrape artifacts and the manifest
    #[serde(rename = "raw-dir")]
    pub raw_dir: PathBuf,

    /// Directory for the processed content bundle
    #[serde(rename = "processed-dir")]
    pub processed_dir: PathBuf,

    /// Directory the viewer serves its content from
    #[serde(rename = "web-content-dir")]
    pub web_content_dir: PathBuf,
}

/// Content normalization configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizerConfig {
    /// Number of sections normalized per PDF
    #[serde(rename = "max-pdf-sections", default = "default_max_pdf_sections")]
    pub max_pdf_sections: usize,

    /// Whether related pages are normalized alongside the main page
    #[serde(rename = "normalize-related-pages", default)]
    pub normalize_related_pages: bool,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            max_pdf_sections: default_max_pdf_sections(),
            normalize_related_pages: false,
        }
    }
}

/// Language-model collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Whether the collaborator is consulted at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of an OpenAI-compatible API
    #[serde(rename = "base-url", default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Maximum output tokens per request
    #[serde(rename = "max-tokens", default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout (seconds)
    #[serde(default = "default_llm_timeout")]
    pub timeout: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout: default_llm_timeout(),
        }
    }
}

/// Site metadata written to the viewer index
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,

    #[serde(default = "default_site_description")]
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            description: default_site_description(),
        }
    }
}

fn default_pacing_delay() -> u64 {
    1000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    1000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_related_pages() -> usize {
    10
}

fn default_source_label() -> String {
    "documentation".to_string()
}

fn default_max_pdf_sections() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u64 {
    60
}

fn default_site_title() -> String {
    "Documentation - Simplified".to_string()
}

fn default_site_description() -> String {
    "Clear, flowing documentation distilled from the source material".to_string()
}
