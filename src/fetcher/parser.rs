//! Contents-API response parser
//!
//! Stateless conversion of GitHub contents-API JSON into [`Entry`] values.
//! The endpoint answers with an array for a directory and with a single
//! object when the path names a file; both become a listing.

use crate::fetcher::{Entry, EntryKind, FetcherError, FetcherResult};
use serde::Deserialize;
use serde_json::Value;

/// One object of a contents-API response, restricted to the fields we use
#[derive(Debug, Deserialize)]
struct ContentItem {
    name: String,
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl From<ContentItem> for Entry {
    fn from(item: ContentItem) -> Self {
        let kind = EntryKind::from_api_type(&item.item_type);
        let (download_url, listing_url) = match kind {
            EntryKind::File => (item.download_url, None),
            EntryKind::Directory => (None, item.url),
            EntryKind::Other(_) => (None, None),
        };

        Entry {
            path: item.name.clone(),
            name: item.name,
            kind,
            download_url,
            listing_url,
        }
    }
}

/// Stateless parser for contents-API responses
pub struct ContentsParser;

impl ContentsParser {
    /// Parse a listing body.
    ///
    /// Accepts either a JSON array of content objects or a single content
    /// object, which is returned as a one-element listing.
    ///
    /// # Errors
    /// Returns [`FetcherError::InvalidResponse`] if the body is not JSON or an
    /// object lacks `name`/`type`.
    pub fn parse_listing(body: &[u8]) -> FetcherResult<Vec<Entry>> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| FetcherError::InvalidResponse(format!("listing is not JSON: {e}")))?;

        Self::parse_listing_value(value)
    }

    /// Parse an already-decoded listing value
    pub fn parse_listing_value(value: Value) -> FetcherResult<Vec<Entry>> {
        let items = match value {
            Value::Array(items) => items,
            object @ Value::Object(_) => vec![object],
            other => {
                return Err(FetcherError::InvalidResponse(format!(
                    "expected an array or object, got {}",
                    json_type_name(&other)
                )));
            }
        };

        items
            .into_iter()
            .map(|item| {
                serde_json::from_value::<ContentItem>(item)
                    .map(Entry::from)
                    .map_err(|e| FetcherError::InvalidResponse(format!("bad content item: {e}")))
            })
            .collect()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
