//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full crawl
//! sessions end-to-end. Every page mock expects exactly one request, so the
//! mock server itself checks that no URL is fetched twice.

use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use webcrawler::config::Config;
use webcrawler::crawler::{crawl, Engine};
use webcrawler::output::SqliteSink;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Link pattern matching URLs on the local mock server
const LOCAL_PATTERN: &str = r"http://127\.0\.0\.1:[0-9]+/[a-zA-Z0-9/._\-]*";

/// Creates a test configuration for crawling a mock server
fn create_test_config(workers: usize, frontier_capacity: usize) -> Config {
    let mut config = Config::default();
    config.crawler.workers = workers;
    config.crawler.frontier_capacity = frontier_capacity;
    config.crawler.fetch_timeout_ms = Some(5000);
    config.crawler.user_agent = "TestBot/1.0".to_string();
    config.links.pattern = LOCAL_PATTERN.to_string();
    config
}

/// Mounts an HTML page that must be fetched exactly once
async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn page_url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).expect("Failed to parse URL")
}

#[tokio::test]
async fn test_cycle_into_sqlite() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/1", format!("{}/2", base_url)).await;
    mount_page(&mock_server, "/2", format!("{}/1", base_url)).await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let sink = Arc::new(SqliteSink::new(&dir.path().join("pages.db")).expect("Failed to open DB"));

    let config = create_test_config(50, 500);
    let summary = crawl(&config, page_url(&mock_server, "/1"), sink.clone())
        .await
        .expect("Crawl failed");

    assert!(summary.completed());
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.pages_delivered, 2);

    assert_eq!(sink.count_pages().unwrap(), 2);
    assert_eq!(
        sink.page_content(&format!("{}/1", base_url)).unwrap(),
        Some(format!("{}/2", base_url))
    );
    assert_eq!(
        sink.page_content(&format!("{}/2", base_url)).unwrap(),
        Some(format!("{}/1", base_url))
    );
}

#[tokio::test]
async fn test_breadth_first_tree() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Root links to two sections, each section links to two leaves and back to root
    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body><a href="{b}/a">A</a> <a href="{b}/b">B</a> <a href="{b}/a">A again</a></body></html>"#,
            b = base_url
        ),
    )
    .await;
    for section in ["a", "b"] {
        mount_page(
            &mock_server,
            &format!("/{}", section),
            format!(
                "<p>{b}/ {b}/{s}/1 {b}/{s}/2</p>",
                b = base_url,
                s = section
            ),
        )
        .await;
        for leaf in 1..=2 {
            mount_page(
                &mock_server,
                &format!("/{}/{}", section, leaf),
                String::from("<p>leaf</p>"),
            )
            .await;
        }
    }

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(SqliteSink::new(&dir.path().join("tree.db")).unwrap());

    let engine = Engine::new(&create_test_config(4, 500), sink.clone()).unwrap();
    let summary = engine.run(page_url(&mock_server, "/")).await;

    assert_eq!(summary.pages_visited, 7);
    assert_eq!(summary.links_enqueued, 6);
    assert_eq!(sink.count_pages().unwrap(), 7);

    let visited = engine.visited();
    for route in ["/", "/a", "/b", "/a/1", "/a/2", "/b/1", "/b/2"] {
        assert!(
            visited.contains(&page_url(&mock_server, route)),
            "{} was not visited",
            route
        );
    }
}

#[tokio::test]
async fn test_fully_connected_pages_fetched_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let routes: Vec<String> = (0..20).map(|i| format!("/page{}", i)).collect();
    let everything: String = routes
        .iter()
        .map(|r| format!("{}{} ", base_url, r))
        .collect();

    for route in &routes {
        mount_page(&mock_server, route, everything.clone()).await;
    }

    let sink = Arc::new(SqliteSink::new_in_memory().unwrap());
    let engine = Engine::new(&create_test_config(10, 500), sink.clone()).unwrap();
    let summary = engine.run(page_url(&mock_server, "/page0")).await;

    assert!(summary.completed());
    assert_eq!(summary.pages_visited, 20);
    assert_eq!(summary.links_enqueued, 19);
    assert_eq!(sink.count_pages().unwrap(), 20);
}

#[tokio::test]
async fn test_tiny_frontier_applies_backpressure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let children: Vec<String> = (0..15).map(|i| format!("/child{}", i)).collect();
    let listing: String = children
        .iter()
        .map(|r| format!("{}{} ", base_url, r))
        .collect();

    mount_page(&mock_server, "/", listing).await;
    for child in &children {
        mount_page(&mock_server, child, String::from("<p>no links</p>")).await;
    }

    let sink = Arc::new(SqliteSink::new_in_memory().unwrap());
    let engine = Engine::new(&create_test_config(4, 1), sink.clone()).unwrap();
    let summary = engine.run(page_url(&mock_server, "/")).await;

    assert!(summary.completed());
    assert_eq!(summary.pages_visited, 16);
    assert_eq!(summary.links_enqueued, 15);
    assert!(engine.frontier().is_empty());
}

#[tokio::test]
async fn test_mixed_failures_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            "{b}/broken {b}/file.pdf {b}/w3.org/TR/html {b}/fine",
            b = base_url
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/file.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(format!("{}/hidden", base_url).into_bytes(), "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/w3.org/TR/html"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/fine", String::from("<p>fine</p>")).await;

    let sink = Arc::new(SqliteSink::new_in_memory().unwrap());
    let engine = Engine::new(&create_test_config(3, 500), sink.clone()).unwrap();
    let summary = engine.run(page_url(&mock_server, "/")).await;

    assert!(summary.completed());
    assert_eq!(summary.pages_visited, 4);
    assert_eq!(summary.pages_delivered, 2);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.non_html_pages, 1);
    assert_eq!(summary.links_denied, 1);

    assert!(engine.visited().contains(&page_url(&mock_server, "/broken")));
    assert!(!engine.visited().is_claimed(&page_url(&mock_server, "/hidden")));
    assert_eq!(sink.count_pages().unwrap(), 2);
}
