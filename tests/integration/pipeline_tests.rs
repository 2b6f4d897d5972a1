//! Integration tests for the enrichment pipeline
//!
//! These tests use wiremock for both the scraped pages and the
//! Ollama-compatible generation and embedding endpoints, and run the full
//! archivist -> curator flow end-to-end.

use bookmark_enricher::agents::Curator;
use bookmark_enricher::config::{load_config_with_hash, Config, CurationConfig};
use bookmark_enricher::services::{
    Embedder, GenerationRequest, OllamaEmbedder, OllamaGenerator, ServiceError, TextGenerator,
};
use bookmark_enricher::state::{CurationMode, CurationStatus, ScrapingStatus, StrategyUsed};
use bookmark_enricher::{ErrorKind, PipelineOrchestrator, PipelineStatus};
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIMENSION: usize = 4;

const FULL_TEXT_REPLY: &str = r#"{"summary": "A guide to async Rust. It covers tokio in depth.", "tags": ["Rust", "async", "tokio", "Guide"], "category": "Programming"}"#;

const URL_ONLY_REPLY: &str = r#"Here you go: {"summary": "A site. Probably useful.", "tags": "misc, web", "category": "Technology", "confidence": 0.8}"#;

/// Creates a test configuration pointing collaborators at `ollama`
///
/// wiremock serves on 127.0.0.1, so private-IP blocking is switched off and
/// only `*.local` hosts count as local.
fn create_test_config(ollama: &MockServer) -> Config {
    let mut config = Config::default();
    config.scraper.delay_between_requests = 0;
    config.scraper.request_timeout = 2_000;
    config.scraper.rate_limit_backoff = 50;
    config.local.domains = vec!["*.local".to_string()];
    config.local.block_private_ips = false;
    config.curation.collaborator_timeout = 2_000;
    config.curation.enhance_generic_titles = false;
    config.llm.endpoint = ollama.uri();
    config.embedding.endpoint = ollama.uri();
    config.embedding.dimension = DIMENSION;
    config
}

fn create_orchestrator(config: &Config) -> PipelineOrchestrator {
    let generator: Arc<dyn TextGenerator> = Arc::new(OllamaGenerator::from_config(&config.llm));
    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::from_config(&config.embedding));
    PipelineOrchestrator::from_config(config, generator, embedder).unwrap()
}

/// Starts a collaborator server that answers every generation with `reply`
async fn start_ollama(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": reply })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "embedding": [0.5, 0.5, 0.5, 0.5] })),
        )
        .mount(&server)
        .await;
    server
}

fn article_page(title: &str, words: usize) -> String {
    format!(
        "<html lang=\"en-US\"><head><title>{}</title></head><body><nav>Menu</nav><article><p>{}</p></article></body></html>",
        title,
        "asynchronous ".repeat(words)
    )
}

async fn serve_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_text_pipeline() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({ "model": "llama3.1:8b", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "response": FULL_TEXT_REPLY })))
        .expect(1)
        .mount(&ollama)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_partial_json(json!({ "model": "all-minilm" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [3.0, 0.0, 4.0, 0.0] })))
        .expect(1)
        .mount(&ollama)
        .await;

    let pages = MockServer::start().await;
    serve_page(&pages, "/guide", article_page("Async Rust Guide | Example Blog", 600)).await;

    let config = create_test_config(&ollama);
    let url = format!("{}/guide", pages.uri());
    let result = create_orchestrator(&config).run(&url, "bookmark").await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert!(result.success);
    assert_eq!(result.clean_title, "Async Rust Guide");
    assert_eq!(result.scraping_status, ScrapingStatus::Success);
    assert_eq!(result.scraping_strategy, StrategyUsed::PrimaryRetry);
    assert_eq!(result.scraping_attempts, 1);
    assert_eq!(result.word_count, 600);
    assert_eq!(result.language.as_deref(), Some("en"));
    assert_eq!(result.domain.as_deref(), Some("127.0.0.1"));
    assert_eq!(result.curation_status, CurationStatus::Success);
    assert_eq!(result.curation_mode, Some(CurationMode::FullText));
    assert_eq!(result.confidence_score, 1.0);
    assert_eq!(result.tags, vec!["async", "guide", "rust", "tokio"]);
    assert!(!result.is_nsfw);
    assert_eq!(result.error, None);
    assert_eq!(result.error_type, None);

    let embedding = result.embedding.clone().unwrap();
    assert_eq!(embedding.len(), DIMENSION);
    assert!((embedding[0] - 0.6).abs() < 1e-6);
    assert!((embedding[2] - 0.8).abs() < 1e-6);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["scraping_strategy"], "primary_retry");
    assert_eq!(json["curation_mode"], "full_text");
    assert_eq!(json["category"], "Programming");
}

#[tokio::test]
async fn test_bot_detection_everywhere_and_generator_down_fails() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ollama)
        .await;

    let pages = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&pages)
        .await;

    let config = create_test_config(&ollama);
    let result = create_orchestrator(&config)
        .run(&pages.uri(), "Blocked Site")
        .await;

    assert_eq!(result.status, PipelineStatus::Failed);
    assert!(!result.success);
    assert_eq!(result.scraping_status, ScrapingStatus::Failed);
    assert_eq!(result.scraping_error_type, Some(ErrorKind::FallbackFailed));
    assert_eq!(result.scraping_attempts, 2);
    assert_eq!(result.curation_status, CurationStatus::Failed);
    assert_eq!(result.curation_mode, Some(CurationMode::UrlOnly));
    assert_eq!(result.error_type, Some(ErrorKind::CollaboratorError));
    assert_eq!(result.summary, None);
    assert_eq!(result.embedding, None);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["scraping_error_type"], "beautifulsoup_failed");
    assert!(json["embedding"].is_null());
}

#[tokio::test]
async fn test_fallback_success_with_short_text_curates_from_url() {
    let ollama = start_ollama(URL_ONLY_REPLY).await;

    let pages = MockServer::start().await;
    // Only the primary strategy sends the full browser header set
    Mock::given(method("GET"))
        .and(header_exists("sec-fetch-mode"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&pages)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><div>Short but readable text</div></body></html>"),
        )
        .expect(1)
        .mount(&pages)
        .await;

    let config = create_test_config(&ollama);
    let result = create_orchestrator(&config).run(&pages.uri(), "").await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert_eq!(result.scraping_strategy, StrategyUsed::Fallback);
    assert_eq!(result.scraping_attempts, 2);
    assert_eq!(result.curation_mode, Some(CurationMode::UrlOnly));
    assert_eq!(result.curation_status, CurationStatus::Fallback);
    assert_eq!(result.confidence_score, 0.8);
    assert_eq!(result.tags, vec!["misc", "web"]);
}

#[tokio::test]
async fn test_timeouts_complete_partially_from_url() {
    let ollama = start_ollama(URL_ONLY_REPLY).await;

    let pages = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page("Slow", 100))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&pages)
        .await;

    let mut config = create_test_config(&ollama);
    config.scraper.request_timeout = 300;
    config.scraper.max_retries = 2;

    let result = create_orchestrator(&config)
        .run(&format!("{}/slow", pages.uri()), "Slow Page")
        .await;

    assert_eq!(result.status, PipelineStatus::CompletedPartial);
    assert!(result.success);
    assert_eq!(result.scraping_status, ScrapingStatus::Failed);
    assert_eq!(result.scraping_error_type, Some(ErrorKind::Timeout));
    assert_eq!(result.scraping_attempts, 2);
    assert_eq!(result.curation_mode, Some(CurationMode::UrlOnly));
    assert_eq!(result.curation_status, CurationStatus::Fallback);
    assert_eq!(result.confidence_score, 0.8);
    assert!(result.confidence_score < 1.0);
    assert_eq!(result.full_text, None);
    assert_eq!(result.error_type, None);
    assert!(result.embedding.is_some());
}

#[tokio::test]
async fn test_rate_limit_backoff_grows_per_attempt() {
    let ollama = start_ollama(URL_ONLY_REPLY).await;

    let pages = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&pages)
        .await;

    let mut config = create_test_config(&ollama);
    config.scraper.rate_limit_backoff = 100;

    let start = Instant::now();
    let result = create_orchestrator(&config).run(&pages.uri(), "Busy").await;

    // Backoff of 100ms then 200ms; no wait after the final attempt
    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(result.scraping_error_type, Some(ErrorKind::RateLimited));
    assert_eq!(result.scraping_attempts, 3);
    assert_eq!(result.status, PipelineStatus::CompletedPartial);
}

#[tokio::test]
async fn test_connection_refused_is_repeatable() {
    let ollama = start_ollama(URL_ONLY_REPLY).await;

    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}/gone", port);

    let config = create_test_config(&ollama);
    let orchestrator = create_orchestrator(&config);
    let first = orchestrator.run(&url, "Gone").await;
    let second = orchestrator.run(&url, "Gone").await;

    assert_eq!(first.scraping_error_type, Some(ErrorKind::ConnectionRefused));
    assert_eq!(first.scraping_error_type, second.scraping_error_type);
    assert_eq!(first.status, second.status);
    assert_eq!(first.scraping_attempts, second.scraping_attempts);
    assert_eq!(first.status, PipelineStatus::CompletedPartial);
}

#[tokio::test]
async fn test_local_urls_require_manual_handling() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ollama)
        .await;

    let mut config = create_test_config(&ollama);
    config.local = Config::default().local;
    let orchestrator = create_orchestrator(&config);

    for url in [
        "http://localhost:8080/admin",
        "http://192.168.1.20/router",
        "https://nas.local/photos",
    ] {
        let result = orchestrator.run(url, "Home").await;

        assert_eq!(result.status, PipelineStatus::ManualRequired, "{}", url);
        assert!(!result.success);
        assert!(result.is_local);
        assert_eq!(result.scraping_status, ScrapingStatus::Skipped);
        assert_eq!(result.scraping_attempts, 0);
        assert_eq!(result.curation_status, CurationStatus::Skipped);
        assert_eq!(result.error_type, Some(ErrorKind::LocalUrl));
    }
}

#[tokio::test]
async fn test_unsafe_title_is_flagged_but_enriched() {
    let ollama = start_ollama(FULL_TEXT_REPLY).await;

    let pages = MockServer::start().await;
    serve_page(&pages, "/night", article_page("Casino Night Reviews", 80)).await;

    let config = create_test_config(&ollama);
    let result = create_orchestrator(&config)
        .run(&format!("{}/night", pages.uri()), "")
        .await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert!(result.is_nsfw);
    assert!(result.nsfw_reason.unwrap().contains("casino"));
}

#[tokio::test]
async fn test_unparseable_generation_fails() {
    let ollama = start_ollama("Sorry, I can't summarize that page.").await;

    let pages = MockServer::start().await;
    serve_page(&pages, "/doc", article_page("Docs", 200)).await;

    let config = create_test_config(&ollama);
    let result = create_orchestrator(&config)
        .run(&format!("{}/doc", pages.uri()), "Docs")
        .await;

    assert_eq!(result.status, PipelineStatus::Failed);
    assert_eq!(result.scraping_status, ScrapingStatus::Success);
    assert_eq!(result.curation_status, CurationStatus::Failed);
    assert_eq!(result.error_type, Some(ErrorKind::ParseError));
    assert!(result.full_text.is_some());
}

#[tokio::test]
async fn test_cancellation_stops_in_flight_run() {
    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ollama)
        .await;

    let pages = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article_page("Slow", 100))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&pages)
        .await;

    let mut config = create_test_config(&ollama);
    config.scraper.request_timeout = 30_000;
    let orchestrator = create_orchestrator(&config);

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let result = orchestrator
        .run_with_cancel(&pages.uri(), "Slow", &cancel)
        .await;

    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(result.status, PipelineStatus::Failed);
    assert_eq!(result.error_type, Some(ErrorKind::Cancelled));
    assert_eq!(result.scraping_error_type, Some(ErrorKind::Cancelled));
    assert_eq!(result.curation_status, CurationStatus::Pending);
}

#[tokio::test]
async fn test_pacing_is_shared_across_concurrent_runs() {
    let ollama = start_ollama(FULL_TEXT_REPLY).await;

    let pages = MockServer::start().await;
    serve_page(&pages, "/a", article_page("Page A", 100)).await;
    serve_page(&pages, "/b", article_page("Page B", 100)).await;

    let mut config = create_test_config(&ollama);
    config.scraper.delay_between_requests = 300;
    let orchestrator = create_orchestrator(&config);

    let url_a = format!("{}/a", pages.uri());
    let url_b = format!("{}/b", pages.uri());
    let start = Instant::now();
    let (a, b) = tokio::join!(orchestrator.run(&url_a, "A"), orchestrator.run(&url_b, "B"));

    assert!(start.elapsed() >= Duration::from_millis(300));
    assert_eq!(a.status, PipelineStatus::Completed);
    assert_eq!(b.status, PipelineStatus::Completed);
}

#[tokio::test]
async fn test_pipeline_from_config_file() {
    let ollama = start_ollama(FULL_TEXT_REPLY).await;
    let pages = MockServer::start().await;
    serve_page(&pages, "/post", article_page("Config Driven", 120)).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[scraper]
delay-between-requests = 0
request-timeout = 2000

[local]
domains = ["*.local"]
block-private-ips = false

[llm]
endpoint = "{uri}"

[embedding]
endpoint = "{uri}"
dimension = 4
"#,
        uri = ollama.uri()
    )
    .unwrap();

    let (config, hash) = load_config_with_hash(file.path()).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(config.embedding.dimension, DIMENSION);

    let result = create_orchestrator(&config)
        .run(&format!("{}/post", pages.uri()), "")
        .await;

    assert_eq!(result.status, PipelineStatus::Completed);
    assert_eq!(result.embedding.map(|e| e.len()), Some(DIMENSION));
}

/// Generator that must never be reached
struct UnreachableGenerator;

#[async_trait::async_trait]
impl TextGenerator for UnreachableGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String, ServiceError> {
        Err(ServiceError::EmptyResponse)
    }
}

#[test]
fn test_mode_threshold_boundary() {
    let config = CurationConfig::default();
    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::from_config(&Config::default().embedding));
    let curator = Curator::new(Arc::new(UnreachableGenerator), embedder, &config);

    let just_short = "x".repeat(49);
    let exactly = "x".repeat(50);
    let padded = format!("   {}   ", just_short);

    assert_eq!(curator.select_mode(Some(&just_short)), CurationMode::UrlOnly);
    assert_eq!(curator.select_mode(Some(&exactly)), CurationMode::FullText);
    assert_eq!(curator.select_mode(Some(&padded)), CurationMode::UrlOnly);
    assert_eq!(curator.select_mode(None), CurationMode::UrlOnly);
}
