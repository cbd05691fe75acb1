//! Fetcher behaviour against a mocked HTTP server.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use listing_fetcher::identity::is_library_user_agent;
use listing_fetcher::{
    FetchFailure, FetchOutcome, Fetcher, IdentityPool, JsonlSink, MemorySink, ReqwestTransport,
    TransportErrorKind,
};

// ─────────────────────── helpers ───────────────────────

fn fetcher_with(sink: Arc<MemorySink>) -> Fetcher {
    let transport = Arc::new(ReqwestTransport::new().expect("client builds"));
    Fetcher::new(transport, IdentityPool::builtin())
        .with_sink(sink)
        .with_timeout(Duration::from_secs(5))
}

async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

// ─────────────────────── success ───────────────────────

#[tokio::test]
async fn ok_response_returns_exact_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/gp/bestsellers/electronics",
        ResponseTemplate::new(200).set_body_string("<html>ok</html>"),
    )
    .await;

    let sink = Arc::new(MemorySink::new());
    let fetcher = fetcher_with(sink.clone());
    let url = format!("{}/gp/bestsellers/electronics", server.uri());

    match fetcher.fetch(&url).await {
        FetchOutcome::Fetched(page) => {
            assert_eq!(page.body, "<html>ok</html>");
            assert_eq!(page.status, 200);
            assert_eq!(page.url, url);
        }
        other => panic!("expected a page, got {other:?}"),
    }
    assert!(sink.is_empty());
}

#[tokio::test]
async fn same_url_twice_yields_same_body() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/zgbs/books",
        ResponseTemplate::new(200).set_body_string("<html>ok</html>"),
    )
    .await;

    let fetcher = fetcher_with(Arc::new(MemorySink::new()));
    let url = format!("{}/zgbs/books", server.uri());

    let first = fetcher.fetch(&url).await.into_body();
    let second = fetcher.fetch(&url).await.into_body();
    assert_eq!(first.as_deref(), Some("<html>ok</html>"));
    assert_eq!(first, second);
}

// ─────────────────────── headers ───────────────────────

#[tokio::test]
async fn every_request_sends_browser_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zgbs/toys"))
        .and(header_exists("user-agent"))
        .and(header_exists("referer"))
        .and(header_exists("accept-language"))
        .and(header_exists("accept-encoding"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(10)
        .mount(&server)
        .await;

    let fetcher = fetcher_with(Arc::new(MemorySink::new()));
    let url = format!("{}/zgbs/toys", server.uri());
    for _ in 0..10 {
        assert!(fetcher.fetch(&url).await.is_fetched());
    }

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 10);
    for req in requests {
        let header = |name: &str| {
            req.headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string()
        };
        let ua = header("user-agent");
        assert!(fetcher.pool().contains_user_agent(&ua), "unexpected UA {ua}");
        assert!(!is_library_user_agent(&ua));
        for name in ["referer", "accept-language", "accept-encoding", "accept"] {
            assert!(!header(name).is_empty(), "{name} missing or empty");
        }
        assert_eq!(header("referer"), "https://www.google.com/");
    }
}

// ─────────────────────── failures ───────────────────────

#[tokio::test]
async fn service_unavailable_is_no_result_and_logged() {
    let server = MockServer::start().await;
    mount(&server, "/zgbs/kitchen", ResponseTemplate::new(503)).await;

    let sink = Arc::new(MemorySink::new());
    let fetcher = fetcher_with(sink.clone());
    let url = format!("{}/zgbs/kitchen", server.uri());

    let outcome = fetcher.fetch(&url).await;
    assert_eq!(
        outcome,
        FetchOutcome::NoResult(FetchFailure::Blocked {
            url: url.clone(),
            status: 503,
        })
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, url);
    assert_eq!(records[0].status, Some(503));
    assert!(records[0].message.contains("503"));
}

#[tokio::test]
async fn endless_redirect_is_unexpected_status() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/zgbs/loop",
        ResponseTemplate::new(302).insert_header("Location", "/zgbs/loop"),
    )
    .await;

    let sink = Arc::new(MemorySink::new());
    let fetcher = fetcher_with(sink.clone());
    let url = format!("{}/zgbs/loop", server.uri());

    let outcome = fetcher.fetch(&url).await;
    assert_eq!(
        outcome,
        FetchOutcome::NoResult(FetchFailure::UnexpectedStatus {
            url: url.clone(),
            status: 302,
        })
    );

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, Some(302));
    assert_eq!(records[0].kind, "unexpected_status");

    // First request plus the capped number of follows.
    let hits = server.received_requests().await.unwrap_or_default();
    assert_eq!(hits.len(), listing_fetcher::transport::MAX_REDIRECTS + 1);
}

#[tokio::test]
async fn slow_server_times_out_without_propagating() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/zgbs/garden",
        ResponseTemplate::new(200)
            .set_body_string("<html>late</html>")
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let sink = Arc::new(MemorySink::new());
    let fetcher = fetcher_with(sink.clone()).with_timeout(Duration::from_millis(200));
    let url = format!("{}/zgbs/garden", server.uri());

    let outcome = fetcher.fetch(&url).await;
    match outcome.failure() {
        Some(FetchFailure::Transport { kind, .. }) => {
            assert_eq!(*kind, TransportErrorKind::Timeout)
        }
        other => panic!("expected a timeout, got {other:?}"),
    }

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, url);
    assert_eq!(records[0].kind, "timeout");
}

#[tokio::test]
async fn run_continues_past_failures() {
    let server = MockServer::start().await;
    mount(&server, "/zgbs/a", ResponseTemplate::new(503)).await;
    mount(
        &server,
        "/zgbs/b",
        ResponseTemplate::new(200).set_body_string("<html>b</html>"),
    )
    .await;
    mount(&server, "/zgbs/c", ResponseTemplate::new(429)).await;

    let sink = Arc::new(MemorySink::new());
    let fetcher = fetcher_with(sink.clone());
    let urls: Vec<String> = ["a", "b", "c"]
        .iter()
        .map(|p| format!("{}/zgbs/{p}", server.uri()))
        .collect();

    let results = fetcher.fetch_all(&urls).await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[1].1.body(), Some("<html>b</html>"));
    assert!(results[0].1.failure().unwrap().is_blocked());
    assert_eq!(results[2].1.failure().unwrap().status(), Some(429));
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn failures_land_in_jsonl_log() {
    let server = MockServer::start().await;
    mount(&server, "/zgbs/pets", ResponseTemplate::new(503)).await;

    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("failures.jsonl");
    let transport = Arc::new(ReqwestTransport::new().unwrap());
    let fetcher = Fetcher::new(transport, IdentityPool::builtin())
        .with_sink(Arc::new(JsonlSink::open(&log_path).unwrap()));

    let url = format!("{}/zgbs/pets", server.uri());
    assert!(!fetcher.fetch(&url).await.is_fetched());
    assert!(!fetcher.fetch(&url).await.is_fetched());

    let contents = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["url"], url.as_str());
    assert_eq!(lines[0]["status"], 503);
    assert_eq!(lines[0]["kind"], "blocked");
}
