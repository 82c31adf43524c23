//! Doc-Distiller main entry point
//!
//! This is the command-line interface for the Doc-Distiller pipeline.

use anyhow::{bail, Context};
use clap::Parser;
use doc_distiller::config::{load_config_with_hash, validate, Config};
use doc_distiller::crawler::{run_pipeline, run_reprocess};
use doc_distiller::extract::extract_pdf_file;
use doc_distiller::output::print_summary;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Doc-Distiller: documentation scraping and simplification
///
/// Doc-Distiller scrapes a documentation page and the PDFs it links to,
/// extracts their structure, rewrites the content into plain markdown and
/// groups it by topic for a static documentation viewer.
#[derive(Parser, Debug)]
#[command(name = "doc-distiller")]
#[command(version = "1.0.0")]
#[command(about = "Scrape, extract and simplify documentation", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", required_unless_present = "pdf")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the main URL from the configuration
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["reprocess", "pdf"])]
    dry_run: bool,

    /// Rebuild content from the raw directory of a previous run
    #[arg(long, conflicts_with_all = ["dry_run", "pdf"])]
    reprocess: bool,

    /// Extract a single local PDF and print the result as JSON
    #[arg(long, value_name = "FILE", conflicts_with_all = ["dry_run", "reprocess"])]
    pdf: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(pdf) = &cli.pdf {
        return handle_pdf(pdf).await;
    }

    let Some(config_path) = &cli.config else {
        bail!("a configuration file is required");
    };

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", config_path.display());
    let (mut config, config_hash) = load_config_with_hash(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(url) = cli.url {
        tracing::info!("Overriding main URL with {}", url);
        config.scraper.main_url = url;
        validate(&config).context("invalid --url")?;
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.reprocess {
        handle_reprocess(config).await?;
    } else {
        handle_run(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doc_distiller=info,warn"),
            1 => EnvFilter::new("doc_distiller=debug,info"),
            2 => EnvFilter::new("doc_distiller=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config) {
    println!("=== Doc-Distiller Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Main URL: {}", config.scraper.main_url);
    println!("  Pacing delay: {}ms", config.scraper.pacing_delay);
    println!(
        "  Retries: {} (base delay {}ms, each retry waits twice that)",
        config.scraper.max_retries, config.scraper.retry_base_delay
    );
    println!("  Request timeout: {}s", config.scraper.request_timeout);
    println!("  Max related pages: {}", config.scraper.max_related_pages);
    match &config.scraper.related_domain {
        Some(domain) => println!("  Related domain: {}", domain),
        None => println!("  Related domain: (host of main URL)"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Raw: {}", config.output.raw_dir.display());
    println!("  Processed: {}", config.output.processed_dir.display());
    println!("  Web content: {}", config.output.web_content_dir.display());

    println!("\nNormalization:");
    println!("  Max PDF sections: {}", config.normalizer.max_pdf_sections);
    println!(
        "  Normalize related pages: {}",
        config.normalizer.normalize_related_pages
    );
    if config.llm.enabled {
        let key_present = std::env::var(&config.llm.api_key_env).is_ok_and(|k| !k.trim().is_empty());
        println!(
            "  Language model: {} at {} (${} {})",
            config.llm.model,
            config.llm.base_url,
            config.llm.api_key_env,
            if key_present { "set" } else { "not set, fallback only" }
        );
    } else {
        println!("  Language model: disabled, fallback only");
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --pdf mode: extracts one local PDF
async fn handle_pdf(path: &Path) -> anyhow::Result<()> {
    tracing::info!("Processing PDF: {}", path.display());
    let extraction = extract_pdf_file(path)
        .await
        .with_context(|| format!("failed to process {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&extraction)?);
    Ok(())
}

/// Handles the --reprocess mode
async fn handle_reprocess(config: Config) -> anyhow::Result<()> {
    let summary = run_reprocess(config)
        .await
        .context("reprocessing failed")?;
    println!();
    print_summary(&summary);
    Ok(())
}

/// Handles the main pipeline run
async fn handle_run(config: Config) -> anyhow::Result<()> {
    match run_pipeline(config).await {
        Ok(summary) => {
            tracing::info!("Run completed successfully");
            println!();
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
