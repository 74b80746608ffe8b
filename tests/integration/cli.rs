//! CLI behavior that needs no network access

use assert_cmd::Command;
use predicates::prelude::*;

fn gitget() -> Command {
    Command::cargo_bin("gitget").unwrap()
}

#[test]
fn test_resolve_prints_parts() {
    gitget()
        .args(["resolve", "https://github.com/o/r/tree/main/docs/guide"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Owner:    o"))
        .stdout(predicate::str::contains(
            "API URL:  https://api.github.com/repos/o/r/contents/docs/guide",
        ))
        .stdout(predicate::str::contains("Filename: guide.zip"));
}

#[test]
fn test_resolve_json_output() {
    let output = gitget()
        .args(["resolve", "--json", "github.com/o/r"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["owner"], "o");
    assert_eq!(value["subpath"], "");
    assert_eq!(value["api_url"], "https://api.github.com/repos/o/r/contents");
    assert_eq!(value["filename"], "r.zip");
}

#[test]
fn test_resolve_invalid_url_fails_with_code() {
    gitget()
        .args(["resolve", "https://gitlab.com/o/r"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("INVALID__URL__SYNTAX"));
}

#[test]
fn test_link_encodes_url() {
    gitget()
        .args(["link", "https://github.com/o/r"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://githives.com/?url=https%3A%2F%2Fgithub.com%2Fo%2Fr",
        ));
}

#[test]
fn test_download_invalid_url_reports_error() {
    let dir = tempfile::TempDir::new().unwrap();
    gitget()
        .args(["download", "https://github.com/o/r/tree/dev/x", "--output-dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("INVALID__URL__SYNTAX"));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_concurrency_is_validated() {
    gitget()
        .args(["download", "github.com/o/r", "--concurrency", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency must be at least 1"));
}
