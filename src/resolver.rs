//! GitHub URL resolution
//!
//! Turns a GitHub web URL into a [`RepoRef`] and builds the matching
//! contents-API URL. Accepted shapes:
//!
//! - `[scheme://][www.]github.com/<owner>/<repo>`
//! - `[scheme://][www.]github.com/<owner>/<repo>/tree/main/<path>`
//! - `[scheme://][www.]github.com/<owner>/<repo>/blob/main/<path>`
//!
//! Resolution is pure: no network access happens here.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use url::Url;

/// Characters escaped when a path segment is placed back into a URL
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Only branch accepted in `/tree/<branch>/` and `/blob/<branch>/` URLs.
pub const DEFAULT_BRANCH: &str = "main";

/// Repository reference extracted from a GitHub URL.
///
/// # Examples
///
/// ```
/// use gitget::resolver::RepoRef;
///
/// let repo = RepoRef::parse("https://github.com/rust-lang/rust/tree/main/src/tools").unwrap();
/// assert_eq!(repo.owner(), "rust-lang");
/// assert_eq!(repo.repo(), "rust");
/// assert_eq!(repo.subpath(), "src/tools");
/// assert_eq!(
///     repo.api_url("https://api.github.com/repos"),
///     "https://api.github.com/repos/rust-lang/rust/contents/src/tools"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    owner: String,
    repo: String,
    subpath: String,
}

impl RepoRef {
    /// Resolve a raw GitHub URL.
    ///
    /// Surrounding whitespace and trailing slashes are stripped before
    /// parsing. A URL without a scheme is read as `https://`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::InvalidUrl`] when the input is not a
    /// `github.com` repository URL of one of the accepted shapes.
    pub fn parse(raw: &str) -> Result<Self, ResolveError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ResolveError::InvalidUrl("URL is empty".to_string()));
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate)
            .map_err(|e| ResolveError::InvalidUrl(format!("{trimmed}: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ResolveError::InvalidUrl(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        match url.host_str() {
            Some("github.com") | Some("www.github.com") => {}
            Some(host) => {
                return Err(ResolveError::InvalidUrl(format!(
                    "expected a github.com URL, got host `{host}`"
                )));
            }
            None => {
                return Err(ResolveError::InvalidUrl(
                    "expected a github.com URL".to_string(),
                ));
            }
        }

        let segments = url
            .path_segments()
            .map(|parts| {
                parts
                    .filter(|s| !s.is_empty())
                    .map(decode_segment)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        let (owner, repo, rest) = match segments.as_slice() {
            [owner, repo, rest @ ..] => (owner.as_str(), repo.as_str(), rest),
            [_] => {
                return Err(ResolveError::InvalidUrl(
                    "missing repository segment: expected github.com/<owner>/<repo>".to_string(),
                ));
            }
            [] => {
                return Err(ResolveError::InvalidUrl(
                    "missing owner and repository: expected github.com/<owner>/<repo>"
                        .to_string(),
                ));
            }
        };

        let subpath = match rest {
            [] => String::new(),
            [mode, branch, path @ ..] if is_tree_or_blob(mode) => {
                if branch != DEFAULT_BRANCH {
                    return Err(ResolveError::InvalidUrl(format!(
                        "unsupported branch `{branch}`: only `{DEFAULT_BRANCH}` is supported"
                    )));
                }
                path.join("/")
            }
            _ => {
                return Err(ResolveError::InvalidUrl(format!(
                    "unexpected path after repository: /{}",
                    rest.join("/")
                )));
            }
        };

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            subpath,
        })
    }

    /// Repository owner (user or organization)
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Path inside the repository, empty for the repository root
    pub fn subpath(&self) -> &str {
        &self.subpath
    }

    /// Build the contents-API URL for this reference.
    ///
    /// Produces `<api_base>/<owner>/<repo>/contents/<subpath>` with every
    /// segment percent-encoded. When the subpath is empty the trailing slash
    /// is omitted entirely (`.../contents`).
    pub fn api_url(&self, api_base: &str) -> String {
        let mut url = format!(
            "{}/{}/{}/contents",
            api_base.trim_end_matches('/'),
            encode_segment(&self.owner),
            encode_segment(&self.repo)
        );
        for segment in self.subpath.split('/').filter(|s| !s.is_empty()) {
            url.push('/');
            url.push_str(&encode_segment(segment));
        }
        url
    }

    /// Name of the downloaded folder: the last subpath segment, or the
    /// repository name when pointing at the root.
    pub fn archive_name(&self) -> &str {
        self.subpath
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(self.repo.as_str())
    }

    /// Suggested filename for the finished archive (`<name>.zip`)
    pub fn archive_filename(&self) -> String {
        format!("{}.zip", self.archive_name())
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.subpath.is_empty() {
            write!(f, "{}/{}", self.owner, self.repo)
        } else {
            write!(f, "{}/{}/{}", self.owner, self.repo, self.subpath)
        }
    }
}

fn decode_segment(segment: &str) -> Result<String, ResolveError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ResolveError::InvalidUrl(format!("path segment `{segment}` is not UTF-8")))
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn is_tree_or_blob(segment: &str) -> bool {
    segment == "tree" || segment == "blob"
}

/// Build a shareable link that re-opens a download for `raw_url`.
///
/// The GitHub URL is carried percent-encoded in the `url` query parameter of
/// `base`, e.g. `https://githives.com/?url=https%3A%2F%2Fgithub.com%2Fo%2Fr`.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidUrl`] if `raw_url` does not resolve, or
/// [`ResolveError::InvalidBase`] if `base` is not an absolute URL.
pub fn share_link(base: &str, raw_url: &str) -> Result<String, ResolveError> {
    RepoRef::parse(raw_url)?;

    let mut link =
        Url::parse(base).map_err(|e| ResolveError::InvalidBase(format!("{base}: {e}")))?;
    link.query_pairs_mut().append_pair("url", raw_url.trim());
    Ok(link.into())
}

/// Errors produced while resolving a GitHub URL
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Input does not match a GitHub repository URL
    #[error("invalid GitHub URL: {0}")]
    InvalidUrl(String),

    /// Share-link base is not a usable URL
    #[error("invalid share link base: {0}")]
    InvalidBase(String),
}
