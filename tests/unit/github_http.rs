//! Unit tests for GithubHttpClient against a mock server

use gitget::downloader::RateLimiter;
use gitget::fetcher::{
    ContentFetcher, EntryKind, FetcherError, GithubHttpClient, NetworkErrorKind,
};
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, limiter: RateLimiter) -> GithubHttpClient {
    GithubHttpClient::new(
        Arc::new(Client::new()),
        Arc::new(limiter),
        format!("{}/repos", server.uri()),
    )
}

#[tokio::test]
async fn test_list_directory_sends_github_accept_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/contents"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "a.txt", "type": "file", "download_url": "https://raw/a.txt", "url": "u1" },
            { "name": "src", "type": "dir", "download_url": null, "url": "https://api/src" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, RateLimiter::unlimited());
    let entries = client
        .list_directory(&format!("{}/repos/o/r/contents", server.uri()))
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, EntryKind::File);
    assert_eq!(entries[0].download_url.as_deref(), Some("https://raw/a.txt"));
    assert_eq!(entries[1].kind, EntryKind::Directory);
    assert_eq!(entries[1].listing_url.as_deref(), Some("https://api/src"));
}

#[tokio::test]
async fn test_download_file_returns_raw_bytes() {
    let server = MockServer::start().await;
    let body: Vec<u8> = (0u8..=255).collect();
    Mock::given(method("GET"))
        .and(path("/raw/bin.dat"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .mount(&server)
        .await;

    let client = client_for(&server, RateLimiter::unlimited());
    let bytes = client
        .download_file(&format!("{}/raw/bin.dat", server.uri()))
        .await
        .unwrap();

    assert_eq!(bytes.as_ref(), body.as_slice());
}

#[tokio::test]
async fn test_not_found_maps_to_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "Not Found", "documentation_url": "x" })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, RateLimiter::unlimited());
    let err = client
        .list_directory(&format!("{}/repos/o/r/contents/nope", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        FetcherError::Network {
            status: Some(404),
            kind: NetworkErrorKind::Status,
            message: "Not Found".to_string(),
        }
    );
}

#[tokio::test]
async fn test_exhausted_quota_is_reported_as_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "message": "API rate limit exceeded for 1.2.3.4." }))
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1700000000"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, RateLimiter::unlimited());
    let err = client
        .list_directory(&format!("{}/repos/o/r/contents", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.http_status(), Some(403));
    let message = err.to_string();
    assert!(message.contains("rate limit exceeded"), "{message}");
    assert!(message.contains("1700000000"), "{message}");
}

#[tokio::test]
async fn test_non_json_listing_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, RateLimiter::unlimited());
    let err = client
        .list_directory(&format!("{}/repos/o/r/contents", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, FetcherError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let http = Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = GithubHttpClient::new(
        Arc::new(http),
        Arc::new(RateLimiter::unlimited()),
        format!("{}/repos", server.uri()),
    );

    let err = client
        .download_file(&format!("{}/raw/slow.txt", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetcherError::Network {
            kind: NetworkErrorKind::Timeout,
            status: None,
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = GithubHttpClient::new(
        Arc::new(Client::new()),
        Arc::new(RateLimiter::unlimited()),
        "http://127.0.0.1:1/repos",
    );

    let err = client
        .list_directory("http://127.0.0.1:1/repos/o/r/contents")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        FetcherError::Network {
            kind: NetworkErrorKind::Transport,
            ..
        }
    ));
}

#[tokio::test]
async fn test_requests_are_paced_by_rate_limiter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, RateLimiter::new(Duration::from_millis(100)));
    let url = format!("{}/raw/x", server.uri());

    let started = Instant::now();
    for _ in 0..3 {
        client.download_file(&url).await.unwrap();
    }

    assert!(started.elapsed() >= Duration::from_millis(200));
}
