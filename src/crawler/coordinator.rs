//! Pipeline coordinator - main run orchestration logic
//!
//! This module drives one run of the pipeline, including:
//! - Fetching and extracting the main page
//! - Discovering PDFs and related pages from its links
//! - Downloading, extracting and normalizing each resource in turn
//! - Writing the manifest and the viewer content artifacts
//!
//! Failures on the main page and on the final writes end the run. Failures on
//! secondary resources are recorded and skipped.

use crate::config::Config;
use crate::crawler::discovery::{discover_pdfs, discover_related, PdfLink};
use crate::crawler::fetcher::{FetchKind, Fetcher};
use crate::extract::{extract_page, extract_pdf, segment, PageDocument, PdfExtraction};
use crate::normalize::{item_id, NormalizedItem, Normalizer, SourceContent};
use crate::output::artifacts::{
    copy_atomic, ensure_dirs, pdf_record_file, CONTENT_FILE, INDEX_FILE, MAIN_PAGE_FILE,
    MANIFEST_FILE,
};
use crate::output::{
    read_json, write_json_atomic, ContentBundle, Manifest, PageFileNamer, ResourceRecord,
    RunSummary, SiteIndex, Structure,
};
use crate::url::extract_domain;
use crate::{DistillError, UrlError};
use std::path::{Path, PathBuf};
use url::Url;

/// Main pipeline coordinator structure
pub struct Coordinator {
    config: Config,
    fetcher: Fetcher,
    normalizer: Normalizer,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// The normalizer uses the language model only if `[llm]` enables it and
    /// its API key is present in the environment.
    ///
    /// # Arguments
    ///
    /// * `config` - The pipeline configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(DistillError)` - Failed to build an HTTP client
    pub fn new(config: Config) -> Result<Self, DistillError> {
        let normalizer = Normalizer::from_config(&config.llm)?;
        Self::with_normalizer(config, normalizer)
    }

    /// Creates a coordinator with an explicit normalizer
    pub fn with_normalizer(config: Config, normalizer: Normalizer) -> Result<Self, DistillError> {
        let fetcher = Fetcher::new(&config)?;
        Ok(Self {
            config,
            fetcher,
            normalizer,
        })
    }

    fn raw_path(&self, file: &str) -> PathBuf {
        self.config.output.raw_dir.join(file)
    }

    /// Runs the full scrape → extract → normalize pipeline
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - Run finished; secondary failures are in the manifest
    /// * `Err(DistillError)` - The main page or a final artifact failed
    pub async fn run(&self) -> Result<RunSummary, DistillError> {
        let main_url = Url::parse(&self.config.scraper.main_url)?;
        tracing::info!("Starting documentation scrape of {}", main_url);

        ensure_dirs(&self.config.output).await?;

        let mut manifest = Manifest::new(main_url.as_str());
        let mut items = Vec::new();

        // Main page: every failure here is fatal
        let page = self.scrape_page(main_url.as_str()).await?;
        let main_output = self.raw_path(MAIN_PAGE_FILE);
        write_json_atomic(&main_output, &page).await?;
        tracing::info!("Saved main page content to {}", main_output.display());

        self.normalize_into(&mut items, SourceContent::Page(&page)).await;

        let pdfs = discover_pdfs(&page.links);
        let domain = self.related_domain(&main_url)?;
        let related = discover_related(&page.links, &domain, self.config.scraper.max_related_pages);
        tracing::info!(
            "Found {} PDF file(s) and {} related page(s) on {}",
            pdfs.len(),
            related.len(),
            domain
        );
        manifest.push_page(page);

        for pdf in &pdfs {
            let record = self.process_pdf(pdf, &mut items).await;
            manifest.push_resource(record);
        }

        let mut namer = PageFileNamer::new();
        let mut related_failed = 0;
        for url in &related {
            if let Err(e) = self
                .process_related(url, &mut namer, &mut manifest, &mut items)
                .await
            {
                tracing::warn!("Failed to scrape {}: {}", url, e);
                related_failed += 1;
            }
        }

        let manifest_path = self.raw_path(MANIFEST_FILE);
        write_json_atomic(&manifest_path, &manifest).await?;
        tracing::info!("Scraping complete, manifest saved to {}", manifest_path.display());

        self.persist_content(manifest, items, related_failed).await
    }

    /// Rebuilds the content artifacts from a previous run's raw directory
    ///
    /// Reads `manifest.json`, `main-page.json` and the extraction record of
    /// every processed PDF. A file whose JSON does not match the expected
    /// record fails with [`DistillError::Shape`].
    pub async fn reprocess(&self) -> Result<RunSummary, DistillError> {
        tracing::info!(
            "Reprocessing raw content in {}",
            self.config.output.raw_dir.display()
        );
        ensure_dirs(&self.config.output).await?;

        let manifest: Manifest = read_json(&self.raw_path(MANIFEST_FILE)).await?;
        let main_page: PageDocument = read_json(&self.raw_path(MAIN_PAGE_FILE)).await?;

        let mut items = Vec::new();
        self.normalize_into(&mut items, SourceContent::Page(&main_page))
            .await;

        for resource in manifest.processed_resources() {
            let record_path = self.raw_path(&pdf_record_file(resource.name()));
            if !tokio::fs::try_exists(&record_path).await? {
                tracing::warn!(
                    "Skipping {}: {} not found",
                    resource.name(),
                    record_path.display()
                );
                continue;
            }

            let extraction: PdfExtraction = read_json(&record_path).await?;
            self.normalize_pdf(resource.name(), &extraction, &mut items)
                .await;
        }

        if self.config.normalizer.normalize_related_pages {
            for file in manifest.referenced_files() {
                let page_path = self.raw_path(file);
                if !tokio::fs::try_exists(&page_path).await? {
                    tracing::warn!("Skipping related page: {} not found", page_path.display());
                    continue;
                }

                let page: PageDocument = read_json(&page_path).await?;
                self.normalize_into(&mut items, SourceContent::Page(&page))
                    .await;
            }
        }

        self.persist_content(manifest, items, 0).await
    }

    /// Domain that related pages must contain
    fn related_domain(&self, main_url: &Url) -> Result<String, DistillError> {
        match &self.config.scraper.related_domain {
            Some(domain) => Ok(domain.clone()),
            None => Ok(extract_domain(main_url).ok_or(UrlError::MissingDomain)?),
        }
    }

    /// Fetches and extracts one HTML page
    async fn scrape_page(&self, url: &str) -> Result<PageDocument, DistillError> {
        tracing::info!("Scraping {}", url);
        let html = self.fetcher.fetch(url, FetchKind::Text).await.into_text()?;
        let page_url = Url::parse(url)?;
        extract_page(&html, &page_url, &self.config.scraper.source_label)
    }

    /// Downloads, extracts and normalizes one PDF, finalizing its record
    async fn process_pdf(&self, pdf: &PdfLink, items: &mut Vec<NormalizedItem>) -> ResourceRecord {
        let pending = ResourceRecord::pending(&pdf.name, &pdf.url);
        let dest = self.raw_path(pending.name());

        match self.download_and_extract(&pdf.url, &pdf.name, &dest).await {
            Ok(extraction) => {
                tracing::info!(
                    "Processed PDF {} ({} page(s))",
                    pdf.name,
                    extraction.page_count
                );
                self.normalize_pdf(&pdf.name, &extraction, items).await;
                pending.succeeded(&dest)
            }
            Err(e) => {
                tracing::warn!("Failed to process PDF {}: {}", pdf.name, e);
                pending.failed(e)
            }
        }
    }

    async fn download_and_extract(
        &self,
        url: &str,
        name: &str,
        dest: &Path,
    ) -> Result<PdfExtraction, DistillError> {
        self.fetcher.download(url, dest).await.into_body()?;
        tracing::info!("Downloaded PDF: {}", name);

        let bytes = tokio::fs::read(dest).await?;
        let extraction = extract_pdf(name, bytes).await?;
        write_json_atomic(&self.raw_path(&pdf_record_file(name)), &extraction).await?;
        Ok(extraction)
    }

    /// Scrapes one related page and records it in the manifest
    async fn process_related(
        &self,
        url: &str,
        namer: &mut PageFileNamer,
        manifest: &mut Manifest,
        items: &mut Vec<NormalizedItem>,
    ) -> Result<(), DistillError> {
        let page = self.scrape_page(url).await?;
        let file = namer.next_name();
        write_json_atomic(&self.raw_path(&file), &page).await?;

        if self.config.normalizer.normalize_related_pages {
            self.normalize_into(items, SourceContent::Page(&page)).await;
        }

        manifest.push_reference(url, file);
        Ok(())
    }

    /// Normalizes the first `max-pdf-sections` sections of a PDF
    async fn normalize_pdf(
        &self,
        name: &str,
        extraction: &PdfExtraction,
        items: &mut Vec<NormalizedItem>,
    ) {
        let sections = segment(&extraction.text);
        let limit = self.config.normalizer.max_pdf_sections;
        tracing::debug!(
            "{}: {} section(s), normalizing {}",
            name,
            sections.len(),
            sections.len().min(limit)
        );

        for section in sections.iter().take(limit) {
            self.normalize_into(items, SourceContent::Section(section))
                .await;
        }
    }

    async fn normalize_into(&self, items: &mut Vec<NormalizedItem>, source: SourceContent<'_>) {
        let id = item_id(items.len());
        items.push(self.normalizer.normalize(id, source).await);
    }

    /// Builds the structure and writes `content.json` and `index.json`
    async fn persist_content(
        &self,
        manifest: Manifest,
        items: Vec<NormalizedItem>,
        related_failed: usize,
    ) -> Result<RunSummary, DistillError> {
        let structure = Structure::build(&items);
        if !structure.is_renderable() {
            tracing::warn!(
                "Only {} website section(s) built; the viewer will show its built-in content",
                structure.sections.len()
            );
        }

        let bundle = ContentBundle {
            manifest,
            content: items,
            structure,
        };
        let summary = RunSummary::collect(
            &bundle.manifest,
            &bundle.content,
            &bundle.structure,
            related_failed,
        );

        let output = &self.config.output;
        let content_path = output.processed_dir.join(CONTENT_FILE);
        write_json_atomic(&content_path, &bundle).await?;

        let web_path = output.web_content_dir.join(CONTENT_FILE);
        copy_atomic(&content_path, &web_path).await?;

        let index = SiteIndex::from_structure(&bundle.structure, &self.config.site);
        write_json_atomic(&output.web_content_dir.join(INDEX_FILE), &index).await?;

        tracing::info!(
            "Processed {} content piece(s) into {} section(s); output saved to {}",
            bundle.content.len(),
            bundle.structure.sections.len(),
            content_path.display()
        );

        Ok(summary)
    }
}

/// Runs a complete pipeline with configuration-driven normalization
pub async fn run_pipeline(config: Config) -> Result<RunSummary, DistillError> {
    Coordinator::new(config)?.run().await
}

/// Rebuilds content artifacts from the raw directory of a previous run
pub async fn run_reprocess(config: Config) -> Result<RunSummary, DistillError> {
    Coordinator::new(config)?.reprocess().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn config_with_output(dir: &Path, related_domain: Option<&str>) -> Config {
        let related = related_domain
            .map(|d| format!("related-domain = \"{}\"\n", d))
            .unwrap_or_default();
        let toml = format!(
            r#"
[scraper]
main-url = "https://docs.example.com/guide"
{related}
[user-agent]
crawler-name = "TestDistiller"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
raw-dir = "{raw}"
processed-dir = "{processed}"
web-content-dir = "{web}"

[llm]
enabled = false
"#,
            related = related,
            raw = dir.join("raw").display(),
            processed = dir.join("processed").display(),
            web = dir.join("web").display(),
        );
        parse_config(&toml).unwrap()
    }

    #[test]
    fn test_related_domain_defaults_to_main_host() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::new(config_with_output(dir.path(), None)).unwrap();
        let main = Url::parse("https://docs.example.com/guide").unwrap();
        assert_eq!(coordinator.related_domain(&main).unwrap(), "docs.example.com");
    }

    #[test]
    fn test_related_domain_override() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator =
            Coordinator::new(config_with_output(dir.path(), Some("example.com"))).unwrap();
        let main = Url::parse("https://docs.example.com/guide").unwrap();
        assert_eq!(coordinator.related_domain(&main).unwrap(), "example.com");
    }

    #[tokio::test]
    async fn test_reprocess_without_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::new(config_with_output(dir.path(), None)).unwrap();
        assert!(matches!(
            coordinator.reprocess().await,
            Err(DistillError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_reprocess_rejects_malformed_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with_output(dir.path(), None);
        std::fs::create_dir_all(&config.output.raw_dir).unwrap();
        std::fs::write(config.output.raw_dir.join(MANIFEST_FILE), "{\"mainUrl\": 1}").unwrap();

        let coordinator = Coordinator::new(config).unwrap();
        assert!(matches!(
            coordinator.reprocess().await,
            Err(DistillError::Shape { .. })
        ));
    }
}
