//! URL resolution across the accepted URL shapes

use gitget::resolver::{RepoRef, ResolveError};

const API: &str = "https://api.github.com/repos";

#[test]
fn test_api_url_carries_extracted_parts() {
    let owners = ["octocat", "rust-lang", "a_b.c"];
    let repos = ["hello-world", "rust", "x"];
    let subpaths = ["", "docs", "src/bin/tools"];
    let prefixes = ["", "www.", "https://", "https://www.", "http://"];

    for owner in owners {
        for repo in repos {
            for subpath in subpaths {
                for prefix in prefixes {
                    let raw = if subpath.is_empty() {
                        format!("{prefix}github.com/{owner}/{repo}")
                    } else {
                        format!("{prefix}github.com/{owner}/{repo}/tree/main/{subpath}")
                    };

                    let parsed = RepoRef::parse(&raw).unwrap_or_else(|e| panic!("{raw}: {e}"));
                    assert_eq!(parsed.owner(), owner);
                    assert_eq!(parsed.repo(), repo);
                    assert_eq!(parsed.subpath(), subpath);

                    let expected = if subpath.is_empty() {
                        format!("{API}/{owner}/{repo}/contents")
                    } else {
                        format!("{API}/{owner}/{repo}/contents/{subpath}")
                    };
                    assert_eq!(parsed.api_url(API), expected);
                    assert_eq!(parsed.api_url(&format!("{API}/")), expected);
                }
            }
        }
    }
}

#[test]
fn test_trailing_slash_is_ignored() {
    let with = RepoRef::parse("https://github.com/o/r/tree/main/docs/").unwrap();
    let without = RepoRef::parse("https://github.com/o/r/tree/main/docs").unwrap();
    assert_eq!(with, without);
}

#[test]
fn test_malformed_urls_fail_with_invalid_url() {
    for raw in [
        "",
        "   ",
        "not a url",
        "https://example.com/o/r",
        "https://github.com",
        "https://github.com/onlyowner",
        "https://github.com/o/r/tree/dev/docs",
        "https://github.com/o/r/pulls",
        "mailto:someone@github.com",
    ] {
        assert!(
            matches!(RepoRef::parse(raw), Err(ResolveError::InvalidUrl(_))),
            "expected InvalidUrl for {raw:?}"
        );
    }
}
