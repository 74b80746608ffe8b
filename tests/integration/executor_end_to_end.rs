//! End-to-end downloads against a mocked GitHub API

use crate::support::{unzip, RecordingNotifier};
use bytes::Bytes;
use gitget::cancel::CancelToken;
use gitget::downloader::{DownloadExecutor, RateLimiter, WalkConfig};
use gitget::fetcher::GithubHttpClient;
use gitget::output::SaveToDirectory;
use gitget::ErrorKind;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_docs_tree(server: &MockServer) {
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/o/r/contents/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "index.md",
                "path": "docs/index.md",
                "type": "file",
                "download_url": format!("{base}/raw/o/r/main/docs/index.md"),
                "url": format!("{base}/repos/o/r/contents/docs/index.md?ref=main")
            },
            {
                "name": "guide",
                "path": "docs/guide",
                "type": "dir",
                "download_url": null,
                "url": format!("{base}/repos/o/r/contents/docs/guide?ref=main")
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/repos/o/r/contents/docs/guide"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "name": "setup.md",
                "path": "docs/guide/setup.md",
                "type": "file",
                "download_url": format!("{base}/raw/o/r/main/docs/guide/setup.md"),
                "url": format!("{base}/repos/o/r/contents/docs/guide/setup.md?ref=main")
            }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/o/r/main/docs/index.md"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"# Docs".to_vec()))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/raw/o/r/main/docs/guide/setup.md"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"cargo install".to_vec()))
        .mount(server)
        .await;
}

fn executor(server: &MockServer) -> DownloadExecutor {
    let client = GithubHttpClient::new(
        Arc::new(Client::new()),
        Arc::new(RateLimiter::unlimited()),
        format!("{}/repos", server.uri()),
    );
    let api_base = client.api_base().to_string();
    DownloadExecutor::new(Arc::new(client), api_base, WalkConfig::default())
        .with_cancel(CancelToken::shared())
}

#[tokio::test]
async fn test_download_folder_to_directory() {
    let server = MockServer::start().await;
    mount_docs_tree(&server).await;

    let dir = TempDir::new().unwrap();
    let trigger = SaveToDirectory::new(dir.path());
    let notifier = RecordingNotifier::default();

    let summary = executor(&server)
        .execute(
            "https://github.com/o/r/tree/main/docs/",
            &notifier,
            &trigger,
        )
        .await
        .unwrap();

    assert_eq!(summary.filename, "docs.zip");
    assert_eq!(summary.files_written, 2);

    let saved = dir.path().join("docs.zip");
    let blob = std::fs::read(&saved).unwrap();
    let files = unzip(&blob);
    assert_eq!(files.len(), 2);
    assert_eq!(files["index.md"], Bytes::from_static(b"# Docs"));
    assert_eq!(files["guide/setup.md"], Bytes::from_static(b"cargo install"));

    assert_eq!(notifier.successes().len(), 1);
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn test_second_download_does_not_overwrite() {
    let server = MockServer::start().await;
    mount_docs_tree(&server).await;

    let dir = TempDir::new().unwrap();
    let trigger = SaveToDirectory::new(dir.path());
    let executor = executor(&server);
    let notifier = RecordingNotifier::default();

    for _ in 0..2 {
        executor
            .execute("github.com/o/r/tree/main/docs", &notifier, &trigger)
            .await
            .unwrap();
    }

    assert!(dir.path().join("docs.zip").exists());
    assert!(dir.path().join("docs (1).zip").exists());
    assert_eq!(trigger.saved_paths().len(), 2);
}

#[tokio::test]
async fn test_missing_file_still_produces_archive() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/o/r/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "ok.txt", "type": "file", "download_url": format!("{base}/raw/ok.txt"), "url": "u" },
            { "name": "gone.txt", "type": "file", "download_url": format!("{base}/raw/gone.txt"), "url": "u" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/ok.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/gone.txt"))
        .respond_with(ResponseTemplate::new(404).set_body_string("404: Not Found"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let trigger = SaveToDirectory::new(dir.path());
    let notifier = RecordingNotifier::default();

    let summary = executor(&server)
        .execute("https://github.com/o/r", &notifier, &trigger)
        .await
        .unwrap();

    assert_eq!(summary.files_written, 1);
    assert_eq!(notifier.warnings().len(), 1);
    assert!(notifier.warnings()[0].contains("gone.txt"));

    let files = unzip(&std::fs::read(dir.path().join("r.zip")).unwrap());
    assert_eq!(files.keys().collect::<Vec<_>>(), vec!["ok.txt"]);
}

#[tokio::test]
async fn test_root_not_found_saves_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/missing/contents"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "message": "Not Found", "documentation_url": "x" })),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let trigger = SaveToDirectory::new(dir.path());
    let notifier = RecordingNotifier::default();

    let err = executor(&server)
        .execute("https://github.com/o/missing", &notifier, &trigger)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.to_string().contains("Not Found"));
    assert!(trigger.saved_paths().is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let errors = notifier.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].1, ErrorKind::Network);
}

#[tokio::test]
async fn test_single_file_url_downloads_one_entry() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/repos/o/r/contents/src/lib.rs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "lib.rs",
            "path": "src/lib.rs",
            "type": "file",
            "download_url": format!("{base}/raw/src/lib.rs"),
            "url": format!("{base}/repos/o/r/contents/src/lib.rs")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/raw/src/lib.rs"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pub fn x() {}".to_vec()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let trigger = SaveToDirectory::new(dir.path());

    executor(&server)
        .execute(
            "https://github.com/o/r/blob/main/src/lib.rs",
            &RecordingNotifier::default(),
            &trigger,
        )
        .await
        .unwrap();

    let files = unzip(&std::fs::read(dir.path().join("lib.rs.zip")).unwrap());
    assert_eq!(files["lib.rs"], Bytes::from_static(b"pub fn x() {}"));
}
