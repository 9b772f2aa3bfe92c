//! Translation of object-store download URLs into `gs://` locators.
//!
//! Download URLs name the object as `/b/<bucket>/o/<percent-encoded-path>`,
//! optionally followed by query parameters such as `?alt=media&token=...`.
//! The model host fetches video itself, so it needs the canonical locator
//! instead of the signed download URL.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

pub const LOCATOR_SCHEME: &str = "gs";

static OBJECT_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/b/([^/]+)/o/([^?]+)").expect("object segment regex is valid"));

/// Convert a download URL into `gs://<bucket>/<decoded-path>`.
/// The URL with its query string removed, safe to log for signed download URLs.
pub fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

pub fn convert_to_storage_locator(url: &str) -> Result<String> {
    let captures = OBJECT_SEGMENT.captures(url).ok_or_else(|| {
        Error::InvalidLocatorFormat(format!("no /b/<bucket>/o/<path> segment in '{}'", url))
    })?;

    let bucket = &captures[1];
    let path = urlencoding::decode(&captures[2]).map_err(|e| {
        Error::InvalidLocatorFormat(format!("object path is not valid UTF-8: {}", e))
    })?;

    Ok(format!("{}://{}/{}", LOCATOR_SCHEME, bucket, path))
}
