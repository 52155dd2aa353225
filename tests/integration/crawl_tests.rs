//! Integration tests for the crawler
//!
//! Graph-shaped tests drive the coordinator with a `StaticFetcher`; the
//! end-to-end tests use wiremock to serve real HTML over HTTP.

use async_trait::async_trait;
use depth_crawler::config::{Config, CrawlerConfig};
use depth_crawler::crawler::{crawl, Coordinator, FetchedPage, Fetcher, StaticFetcher};
use depth_crawler::output::MemoryReporter;
use depth_crawler::{FetchError, UnitOutcome};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NO_LINKS: [&str; 0] = [];

fn create_test_config(seed: &str, max_depth: u32) -> CrawlerConfig {
    CrawlerConfig {
        seed_url: Some(seed.to_string()),
        max_depth,
        max_concurrent_fetches: 4,
        ..CrawlerConfig::default()
    }
}

/// Never returns from `fetch`
struct HangingFetcher {
    started: AtomicUsize,
}

#[async_trait]
impl Fetcher for HangingFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Sleeps on every fetch and records the peak number in flight
struct SlowFetcher {
    inner: StaticFetcher,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Fetcher for SlowFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.fetch(url).await
    }
}

#[tokio::test]
async fn test_small_graph_visits_each_page_once() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page("http://a/", "A", ["http://b/", "http://c/"])
            .with_page("http://b/", "B", NO_LINKS)
            .with_page("http://c/", "C", ["http://a/"]),
    );
    let reporter = Arc::new(MemoryReporter::new());

    let stats = Coordinator::new(
        &create_test_config("http://a/", 2),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap()
    .run()
    .await;

    let mut visited = reporter.visited_urls();
    visited.sort();
    assert_eq!(visited, vec!["http://a/", "http://b/", "http://c/"]);
    assert_eq!(fetcher.fetch_count("http://a/"), 1);
    assert!(reporter.errors().is_empty());
    assert_eq!(stats.pages_visited(), 3);
    assert!(!stats.cancelled);
}

#[tokio::test]
async fn test_link_back_to_seed_is_a_duplicate_with_depth_left() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page("http://a/", "A", ["http://b/", "http://c/"])
            .with_page("http://b/", "B", NO_LINKS)
            .with_page("http://c/", "C", ["http://a/"]),
    );
    let reporter = Arc::new(MemoryReporter::new());

    let stats = Coordinator::new(
        &create_test_config("http://a/", 3),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap()
    .run()
    .await;

    assert_eq!(fetcher.fetch_count("http://a/"), 1);
    assert_eq!(stats.pages_visited(), 3);
    assert_eq!(stats.count(UnitOutcome::Duplicate), 1);
    assert_eq!(stats.urls_claimed, 3);
}

#[tokio::test]
async fn test_seed_failure_reports_one_error() {
    let fetcher = Arc::new(StaticFetcher::new().with_error(
        "http://a/",
        FetchError::HttpStatus {
            url: "http://a/".to_string(),
            status: 500,
        },
    ));
    let reporter = Arc::new(MemoryReporter::new());

    let stats = Coordinator::new(
        &create_test_config("http://a/", 2),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap()
    .run()
    .await;

    assert!(reporter.visited_urls().is_empty());
    assert_eq!(reporter.errors().len(), 1);
    assert_eq!(reporter.lines(), vec!["HTTP error 500 for URL http://a/"]);
    assert_eq!(stats.fetch_errors(), 1);
    assert_eq!(fetcher.total_fetches(), 1);
}

#[tokio::test]
async fn test_zero_depth_fetches_nothing() {
    let fetcher = Arc::new(StaticFetcher::new().with_page("http://a/", "A", ["http://b/"]));
    let reporter = Arc::new(MemoryReporter::new());

    let stats = tokio::time::timeout(
        Duration::from_secs(5),
        Coordinator::new(
            &create_test_config("http://a/", 0),
            Arc::clone(&fetcher),
            reporter.clone(),
        )
        .unwrap()
        .run(),
    )
    .await
    .expect("run did not terminate");

    assert_eq!(fetcher.total_fetches(), 0);
    assert!(reporter.events().is_empty());
    assert_eq!(stats.count(UnitOutcome::DepthExhausted), 1);
    assert_eq!(stats.urls_claimed, 0);
}

#[tokio::test]
async fn test_failed_fetch_creates_no_children() {
    // b fails; nothing reachable only through b may be fetched
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page("http://a/", "A", ["http://b/", "http://c/"])
            .with_error(
                "http://b/",
                FetchError::Timeout {
                    url: "http://b/".to_string(),
                },
            )
            .with_page("http://c/", "C", NO_LINKS)
            .with_page("http://d/", "D", NO_LINKS),
    );
    let reporter = Arc::new(MemoryReporter::new());

    let stats = Coordinator::new(
        &create_test_config("http://a/", 4),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap()
    .run()
    .await;

    assert_eq!(fetcher.fetch_count("http://d/"), 0);
    assert_eq!(stats.fetch_errors(), 1);
    assert_eq!(stats.pages_visited(), 2);
    assert_eq!(stats.total_units(), 3);
    assert_eq!(reporter.errors()[0].url(), "http://b/");
}

#[tokio::test]
async fn test_depth_bounds_a_chain() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page("http://1/", "1", ["http://2/"])
            .with_page("http://2/", "2", ["http://3/"])
            .with_page("http://3/", "3", ["http://4/"])
            .with_page("http://4/", "4", ["http://5/"])
            .with_page("http://5/", "5", NO_LINKS),
    );
    let reporter = Arc::new(MemoryReporter::new());

    let stats = Coordinator::new(
        &create_test_config("http://1/", 3),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap()
    .run()
    .await;

    assert_eq!(reporter.visited_urls(), vec!["http://1/", "http://2/", "http://3/"]);
    assert_eq!(fetcher.fetch_count("http://4/"), 0);
    assert_eq!(fetcher.fetch_count("http://5/"), 0);
    assert_eq!(stats.count(UnitOutcome::DepthExhausted), 1);
}

#[tokio::test]
async fn test_cyclic_graph_terminates() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page("http://a/", "A", ["http://b/", "http://a/"])
            .with_page("http://b/", "B", ["http://a/", "http://b/"]),
    );
    let reporter = Arc::new(MemoryReporter::new());

    let coordinator = Coordinator::new(
        &create_test_config("http://a/", 50),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap();
    let tracker = coordinator.tracker();

    let stats = tokio::time::timeout(Duration::from_secs(5), coordinator.run())
        .await
        .expect("run did not terminate");

    assert!(tracker.is_complete());
    assert_eq!(fetcher.fetch_count("http://a/"), 1);
    assert_eq!(fetcher.fetch_count("http://b/"), 1);
    assert_eq!(stats.count(UnitOutcome::Duplicate), 3);
}

#[tokio::test]
async fn test_page_cap_limits_visits() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_page("http://a/", "A", ["http://b/", "http://c/", "http://d/"])
            .with_page("http://b/", "B", NO_LINKS)
            .with_page("http://c/", "C", NO_LINKS)
            .with_page("http://d/", "D", NO_LINKS),
    );
    let reporter = Arc::new(MemoryReporter::new());

    let mut config = create_test_config("http://a/", 3);
    config.max_pages = Some(2);

    let stats = Coordinator::new(&config, Arc::clone(&fetcher), reporter.clone())
        .unwrap()
        .run()
        .await;

    assert_eq!(reporter.visited_urls().len(), 2);
    assert_eq!(fetcher.total_fetches(), 2);
    assert_eq!(stats.count(UnitOutcome::PageLimitHit), 2);
    assert_eq!(stats.urls_claimed, 2);
}

#[tokio::test]
async fn test_concurrency_limit_bounds_fetches_in_flight() {
    let links: Vec<String> = (0..12).map(|i| format!("http://leaf{}/", i)).collect();
    let mut inner = StaticFetcher::new().with_page("http://root/", "root", links.clone());
    for link in &links {
        inner = inner.with_page(link, "leaf", NO_LINKS);
    }
    let fetcher = Arc::new(SlowFetcher {
        inner,
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let reporter = Arc::new(MemoryReporter::new());

    let mut config = create_test_config("http://root/", 2);
    config.max_concurrent_fetches = 3;

    let stats = Coordinator::new(&config, Arc::clone(&fetcher), reporter.clone())
        .unwrap()
        .run()
        .await;

    assert_eq!(stats.pages_visited(), 13);
    let peak = fetcher.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 3, "peak in-flight fetches was {}", peak);
}

#[tokio::test]
async fn test_cancellation_stops_hung_fetch() {
    let fetcher = Arc::new(HangingFetcher {
        started: AtomicUsize::new(0),
    });
    let reporter = Arc::new(MemoryReporter::new());
    let token = CancellationToken::new();

    let coordinator = Coordinator::new(
        &create_test_config("http://a/", 2),
        Arc::clone(&fetcher),
        reporter.clone(),
    )
    .unwrap()
    .with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();
    });

    let stats = tokio::time::timeout(Duration::from_secs(5), coordinator.run())
        .await
        .expect("cancelled run did not terminate");
    canceller.await.unwrap();

    assert!(stats.cancelled);
    assert_eq!(fetcher.started.load(Ordering::SeqCst), 1);
    assert_eq!(stats.count(UnitOutcome::Cancelled), 1);
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_run_deadline_stops_hung_fetch() {
    let fetcher = Arc::new(HangingFetcher {
        started: AtomicUsize::new(0),
    });
    let reporter = Arc::new(MemoryReporter::new());
    let token = CancellationToken::new();

    let mut config = create_test_config("http://a/", 2);
    config.run_timeout_ms = Some(100);

    let stats = tokio::time::timeout(
        Duration::from_secs(5),
        Coordinator::new(&config, Arc::clone(&fetcher), reporter.clone())
            .unwrap()
            .with_cancellation(token.clone())
            .run(),
    )
    .await
    .expect("run did not stop at its deadline");

    assert!(stats.cancelled);
    assert!(!token.is_cancelled());
    assert!(reporter.events().is_empty());
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(
                    r#"<html><body>
                    <a href="{}/page1">Page 1</a>
                    <a href="{}/missing">Missing</a>
                    </body></html>"#,
                    base_url, base_url
                ))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(r#"<a href="{}/">Home</a>"#, base_url))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler = create_test_config(&format!("{}/", base_url), 3);

    let reporter = Arc::new(MemoryReporter::new());
    let stats = crawl(&config, reporter.clone(), CancellationToken::new())
        .await
        .expect("crawl failed");

    let mut visited = reporter.visited_urls();
    visited.sort();
    assert_eq!(
        visited,
        vec![format!("{}/", base_url), format!("{}/page1", base_url)]
    );
    assert_eq!(
        reporter.errors(),
        vec![FetchError::HttpStatus {
            url: format!("{}/missing", base_url),
            status: 404,
        }]
    );
    assert_eq!(stats.pages_visited(), 2);
    assert_eq!(stats.count(UnitOutcome::Duplicate), 1);
}

#[tokio::test]
async fn test_relative_links_followed_when_resolving() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"<a href="intro">Intro</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(ResponseTemplate::new(200).set_body_string("intro"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::default();
    config.crawler = create_test_config(&format!("{}/docs/", base_url), 2);
    config.crawler.resolve_relative_links = true;

    let reporter = Arc::new(MemoryReporter::new());
    crawl(&config, reporter.clone(), CancellationToken::new())
        .await
        .expect("crawl failed");

    assert!(reporter
        .lines()
        .contains(&format!(r#"found : {}/docs/intro "intro""#, base_url)));
}

#[tokio::test]
async fn test_crawl_rejects_missing_seed() {
    let reporter = Arc::new(MemoryReporter::new());
    let result = crawl(&Config::default(), reporter, CancellationToken::new()).await;
    assert!(result.is_err());
}
