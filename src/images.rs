// src/images.rs
use once_cell::sync::Lazy;
use regex::Regex;

const CDN_HOST: &str = "googleusercontent.com";
const CDN_PREFIX: &str = "https://lh3.googleusercontent.com/d/";

/// `/file/d/<ID>/view`, `/d/<ID>` …
static PATH_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/d/([^/?#&]+)").expect("path id regex"));
/// `uc?id=<ID>`, `open?id=<ID>`, `uc?export=view&id=<ID>` …
static QUERY_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"id=([^&#]+)").expect("query id regex"));

/// Turn a Drive sharing link into a direct image URL.
///
/// CDN links are returned unchanged; anything unrecognised becomes `""`.
pub fn normalize_drive_image(raw: &str) -> String {
    let url = raw.trim_matches('"');
    if url.is_empty() {
        return String::new();
    }
    if url.contains(CDN_HOST) {
        return url.to_string();
    }
    PATH_ID
        .captures(url)
        .or_else(|| QUERY_ID.captures(url))
        .map(|caps| format!("{}{}", CDN_PREFIX, &caps[1]))
        .unwrap_or_default()
}

/// Normalise every candidate and keep the usable ones, in order.
pub fn normalize_pictures<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    raw.into_iter()
        .map(normalize_drive_image)
        .filter(|u| !u.is_empty())
        .collect()
}
