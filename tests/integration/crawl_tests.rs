//! Integration tests for the pipeline
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! scrape → extract → normalize cycle end-to-end.

use doc_distiller::config::{
    Config, LlmConfig, NormalizerConfig, OutputConfig, ScraperConfig, SiteConfig,
    UserAgentConfig,
};
use doc_distiller::crawler::Coordinator;
use doc_distiller::normalize::{Normalizer, OpenAiGenerator};
use doc_distiller::DistillError;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration scraping `{base_url}/docs` into `dir`
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    Config {
        scraper: ScraperConfig {
            main_url: format!("{}/docs", base_url),
            pacing_delay: 1, // Very short for testing
            max_retries: 1,
            retry_base_delay: 1,
            request_timeout: 5,
            max_related_pages: 10,
            related_domain: None,
            source_label: "test-docs".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            raw_dir: dir.join("data/raw"),
            processed_dir: dir.join("data/processed"),
            web_content_dir: dir.join("web/public/content"),
        },
        normalizer: NormalizerConfig::default(),
        llm: LlmConfig {
            enabled: false,
            ..LlmConfig::default()
        },
        site: SiteConfig::default(),
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
    serde_json::from_str(&text).unwrap()
}

/// Builds a one-page PDF with one text line per entry
fn build_pdf(lines: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[tokio::test]
async fn test_full_run_records_failed_pdf_and_continues() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page(
            "Widget Guide",
            &format!(
                r##"<h1>Widgets</h1><p>Widgets are the building blocks.</p>
                <pre>npm install</pre>
                <a href="/files/broken.pdf">Broken manual</a>
                <a href="{}/files/guide.pdf">Guide</a>
                <a href="/related/a">Related A</a>
                <a href="/related/missing">Missing</a>
                <a href="/related/a#section">Anchor</a>
                <a href="https://elsewhere.invalid/page">Elsewhere</a>"##,
                base_url
            ),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    // One attempt plus one retry
    Mock::given(method("GET"))
        .and(path("/files/broken.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/guide.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(build_pdf(&[
                    "GETTING STARTED",
                    "Install the tools first.",
                    "DEPLOYMENT",
                    "Publish the app when ready.",
                ]))
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/related/a"))
        .respond_with(html_page("Related A", "<p>More about data layers.</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/related/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let output = config.output.clone();

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let summary = coordinator.run().await.expect("Run should succeed");

    assert_eq!(summary.pages_scraped, 2, "main page plus one related page");
    assert_eq!(summary.related_failed, 1);
    assert_eq!(summary.pdfs_processed, 1);
    assert_eq!(summary.pdfs_failed, 1);
    assert_eq!(summary.items_generated, 0);
    assert!(summary.items_fallback >= 1);

    // Manifest
    let manifest = read_json(&output.raw_dir.join("manifest.json"));
    assert_eq!(manifest["mainUrl"], format!("{}/docs", base_url));
    assert!(manifest["scraped"].is_string());

    let resources = manifest["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0]["type"], "pdf");
    assert_eq!(resources[0]["name"], "broken.pdf");
    assert_eq!(resources[0]["processed"], false);
    assert!(resources[0]["error"].as_str().unwrap().contains("500"));
    assert!(resources[0].get("localPath").is_none());
    assert_eq!(resources[1]["name"], "guide.pdf");
    assert_eq!(resources[1]["processed"], true);

    let content = manifest["content"].as_array().unwrap();
    assert_eq!(content.len(), 2);
    assert_eq!(content[0]["title"], "Widget Guide");
    assert_eq!(content[1]["url"], format!("{}/related/a", base_url));
    let related_file = content[1]["file"].as_str().unwrap();
    assert!(related_file.starts_with("page-"));

    // Raw artifacts
    let main_page = read_json(&output.raw_dir.join("main-page.json"));
    assert_eq!(main_page["source"], "test-docs");
    assert_eq!(main_page["codeBlocks"][0], "npm install");
    assert_eq!(
        main_page["links"][0]["url"],
        format!("{}/files/broken.pdf", base_url)
    );
    assert!(output.raw_dir.join("guide.pdf").exists());
    assert!(!output.raw_dir.join("broken.pdf").exists());
    let record = read_json(&output.raw_dir.join("guide.pdf.json"));
    assert_eq!(record["pageCount"], 1);
    assert_eq!(read_json(&output.raw_dir.join(related_file))["title"], "Related A");

    // Content artifacts
    let processed = std::fs::read(output.processed_dir.join("content.json")).unwrap();
    let web = std::fs::read(output.web_content_dir.join("content.json")).unwrap();
    assert_eq!(processed, web);

    let bundle: Value = serde_json::from_slice(&processed).unwrap();
    assert_eq!(bundle["content"][0]["id"], "section-0");
    assert_eq!(bundle["content"][0]["strategy"], "fallback");
    assert!(bundle["content"][0]["content"]
        .as_str()
        .unwrap()
        .starts_with("# Widget Guide\n\n"));
    assert_eq!(bundle["manifest"]["resources"].as_array().unwrap().len(), 2);

    let index = read_json(&output.web_content_dir.join("index.json"));
    assert_eq!(index["title"], "Documentation - Simplified");
    assert_eq!(
        index["sections"].as_array().unwrap().len(),
        bundle["structure"]["sections"].as_array().unwrap().len()
    );
}

#[tokio::test]
async fn test_main_page_failure_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let raw_dir = config.output.raw_dir.clone();

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let result = coordinator.run().await;

    assert!(matches!(
        result,
        Err(DistillError::Network { attempts: 2, .. })
    ));
    assert!(!raw_dir.join("manifest.json").exists());
    assert!(!raw_dir.join("main-page.json").exists());
}

#[tokio::test]
async fn test_non_markup_main_page_is_fatal() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain text only"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let raw_dir = config.output.raw_dir.clone();

    let result = Coordinator::new(config).unwrap().run().await;

    assert!(matches!(result, Err(DistillError::HtmlParse { .. })));
    assert!(!raw_dir.join("manifest.json").exists());
}

#[tokio::test]
async fn test_related_pages_are_capped() {
    let mock_server = MockServer::start().await;

    let links: String = (0..25)
        .map(|i| format!(r#"<a href="/p/{}">Page {}</a>"#, i, i))
        .collect();

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page("Index", &links))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p/\d+$"))
        .respond_with(html_page("Child", "<p>child</p>"))
        .expect(10)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let raw_dir = config.output.raw_dir.clone();

    let summary = Coordinator::new(config).unwrap().run().await.unwrap();
    assert_eq!(summary.pages_scraped, 11);

    let manifest = read_json(&raw_dir.join("manifest.json"));
    let content = manifest["content"].as_array().unwrap();
    assert_eq!(content.len(), 11);
    assert_eq!(
        content[10]["url"],
        format!("{}/p/9", mock_server.uri())
    );

    // Every related page got its own file
    let mut files: Vec<_> = content[1..]
        .iter()
        .map(|entry| entry["file"].as_str().unwrap().to_string())
        .collect();
    files.sort();
    files.dedup();
    assert_eq!(files.len(), 10);
}

#[tokio::test]
async fn test_requests_are_paced() {
    let mock_server = MockServer::start().await;
    let pacing = Duration::from_millis(100);

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page(
            "Index",
            r#"<a href="/p/1">1</a><a href="/p/2">2</a><a href="/p/3">3</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/p/\d+$"))
        .respond_with(html_page("Child", "<p>child</p>"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.scraper.pacing_delay = pacing.as_millis() as u64;

    let coordinator = Coordinator::new(config).unwrap();
    let started = Instant::now();
    coordinator.run().await.unwrap();

    // Four requests: three intervals between their starts
    assert!(
        started.elapsed() >= pacing * 3,
        "run finished in {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_pacing_waits_after_slow_responses() {
    let mock_server = MockServer::start().await;
    let pacing = Duration::from_millis(300);
    let latency = Duration::from_millis(400);

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page("Index", r#"<a href="/p/1">1</a>"#).set_delay(latency))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(html_page("Child", "<p>child</p>").set_delay(latency))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.scraper.pacing_delay = pacing.as_millis() as u64;

    let coordinator = Coordinator::new(config).unwrap();
    let started = Instant::now();
    coordinator.run().await.unwrap();

    // Slow main page, full pacing delay, then the slow related page
    assert!(
        started.elapsed() >= latency * 2 + pacing,
        "run finished in {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_language_model_output_is_used() {
    let mock_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page("Guide", "<p>Some text.</p>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "# Deploying your app\n\nShare it." } }]
        })))
        .expect(1)
        .mount(&llm_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.llm = LlmConfig {
        base_url: format!("{}/v1", llm_server.uri()),
        timeout: 5,
        ..LlmConfig::default()
    };
    let processed_dir = config.output.processed_dir.clone();

    let generator = OpenAiGenerator::new(&config.llm, "sk-test".to_string()).unwrap();
    let normalizer = Normalizer::with_generator(Box::new(generator), &config.llm);
    let coordinator = Coordinator::with_normalizer(config, normalizer).unwrap();

    let summary = coordinator.run().await.unwrap();
    assert_eq!(summary.items_generated, 1);
    assert_eq!(summary.items_fallback, 0);

    let bundle = read_json(&processed_dir.join("content.json"));
    assert_eq!(bundle["content"][0]["content"], "# Deploying your app\n\nShare it.");
    assert_eq!(bundle["content"][0]["topic"], "deployment");
    assert_eq!(bundle["structure"]["sections"][0]["id"], "deployment");
}

#[tokio::test]
async fn test_language_model_failure_falls_back() {
    let mock_server = MockServer::start().await;
    let llm_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page("Guide", "<p>Some text.</p>"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&llm_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.llm = LlmConfig {
        base_url: format!("{}/v1", llm_server.uri()),
        timeout: 5,
        ..LlmConfig::default()
    };

    let generator = OpenAiGenerator::new(&config.llm, "sk-test".to_string()).unwrap();
    let normalizer = Normalizer::with_generator(Box::new(generator), &config.llm);
    let summary = Coordinator::with_normalizer(config, normalizer)
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(summary.items_generated, 0);
    assert_eq!(summary.items_fallback, 1);
}

#[tokio::test]
async fn test_reprocess_rebuilds_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page(
            "Getting Started",
            r#"<p>Introduction.</p><a href="/p/1">Next</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(html_page("Widgets", "<p>Widget catalog.</p>"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.normalizer.normalize_related_pages = true;
    let output = config.output.clone();

    let coordinator = Coordinator::new(config).unwrap();
    let first = coordinator.run().await.unwrap();
    assert_eq!(first.items_total(), 2);
    assert!(first.renderable);

    std::fs::remove_file(output.processed_dir.join("content.json")).unwrap();
    std::fs::remove_file(output.web_content_dir.join("index.json")).unwrap();

    let second = coordinator.reprocess().await.unwrap();
    assert_eq!(second.items_total(), 2);
    assert_eq!(second.sections_built, first.sections_built);

    let bundle = read_json(&output.processed_dir.join("content.json"));
    let ids: Vec<_> = bundle["structure"]["navigation"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["getting-started", "widgets"]);
    assert!(output.web_content_dir.join("index.json").exists());
}

#[tokio::test]
async fn test_reprocess_skips_missing_related_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html_page(
            "Getting Started",
            r#"<p>Introduction.</p><a href="/p/1">Next</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/p/1"))
        .respond_with(html_page("Widgets", "<p>Widget catalog.</p>"))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.normalizer.normalize_related_pages = true;
    let raw_dir = config.output.raw_dir.clone();

    let coordinator = Coordinator::new(config).unwrap();
    assert_eq!(coordinator.run().await.unwrap().items_total(), 2);

    let manifest = read_json(&raw_dir.join("manifest.json"));
    let file = manifest["content"]
        .as_array()
        .unwrap()
        .iter()
        .find_map(|entry| entry["file"].as_str())
        .unwrap()
        .to_string();
    std::fs::remove_file(raw_dir.join(file)).unwrap();

    let summary = coordinator.reprocess().await.unwrap();
    assert_eq!(summary.items_total(), 1);
}
