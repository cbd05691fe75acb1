//! `fetch` subcommand against a mocked server.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use listing_fetcher::FetcherConfig;
use listing_fetcher_cli::commands::fetch::{build_fetcher, run, FetchArgs};

async fn server_with_blocks() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zgbs/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zgbs/blocked"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn report_counts_fetched_and_failed_targets() {
    let server = server_with_blocks().await;
    let dir = tempfile::tempdir().unwrap();
    let targets = dir.path().join("targets.txt");
    std::fs::write(
        &targets,
        format!("# category pages\n{}/zgbs/blocked\n", server.uri()),
    )
    .unwrap();
    let failure_log = dir.path().join("out").join("failures.jsonl");

    let args = FetchArgs {
        urls: vec![format!("{}/zgbs/ok", server.uri())],
        file: Some(targets),
        failure_log: Some(failure_log.clone()),
        json: true,
        ..FetchArgs::default()
    };
    let report = run(&FetcherConfig::default(), &args).await.unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.fetched, 1);
    assert_eq!(report.no_result, 1);
    assert_eq!(report.targets[0].bytes, Some("<html>ok</html>".len()));
    assert_eq!(report.targets[1].status, Some(503));
    assert_eq!(report.targets[1].kind.as_deref(), Some("blocked"));

    let logged = std::fs::read_to_string(&failure_log).unwrap();
    assert_eq!(logged.lines().count(), 1);
    assert!(logged.contains("/zgbs/blocked"));
}

#[tokio::test]
async fn no_targets_is_an_error() {
    let result = run(&FetcherConfig::default(), &FetchArgs::default()).await;
    assert!(result.is_err());
}

#[test]
fn timeout_override_is_applied() {
    let args = FetchArgs {
        timeout_ms: Some(1234),
        ..FetchArgs::default()
    };
    let fetcher = build_fetcher(&FetcherConfig::default(), &args).unwrap();
    assert_eq!(fetcher.timeout().as_millis(), 1234);
}

#[test]
fn invalid_timeout_override_is_rejected() {
    let args = FetchArgs {
        timeout_ms: Some(0),
        ..FetchArgs::default()
    };
    assert!(build_fetcher(&FetcherConfig::default(), &args).is_err());
}
