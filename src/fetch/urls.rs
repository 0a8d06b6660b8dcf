// src/fetch/urls.rs
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// `/spreadsheets/d/<ID>` optionally followed by `/edit…`.
static EDITOR_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(/spreadsheets/d/[^/]+)(?:/edit[^/]*)?/?$").expect("editor path regex")
});

fn query_value(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// `gid` from the query, or from a `#gid=…` fragment as the editor writes it.
fn sheet_gid(url: &Url) -> Option<String> {
    query_value(url, "gid").or_else(|| {
        url.fragment()?
            .split('&')
            .find_map(|part| part.strip_prefix("gid="))
            .filter(|g| !g.is_empty())
            .map(str::to_string)
    })
}

fn is_csv_export(url: &Url) -> bool {
    url.path().ends_with("/export")
        || query_value(url, "format").as_deref() == Some("csv")
        || query_value(url, "output").as_deref() == Some("csv")
}

/// Rewrite a sheet URL into one that serves CSV.
///
/// * editor links (`…/d/<ID>/edit?gid=G`, `…/edit#gid=G`) become
///   `…/d/<ID>/export?format=csv&gid=G`
/// * publish-to-web pages (`…/pubhtml`) become `…/pub?output=csv`
/// * anything already serving CSV, or unrecognised, passes through
pub fn export_csv_url(sheet_url: &str) -> Result<Url> {
    let mut url = Url::parse(sheet_url.trim())
        .with_context(|| format!("parsing sheet URL {}", sheet_url))?;

    if is_csv_export(&url) {
        return Ok(url);
    }

    let gid = sheet_gid(&url);

    if let Some(base) = url.path().strip_suffix("/pubhtml").map(str::to_string) {
        url.set_path(&format!("{}/pub", base));
        url.set_fragment(None);
        let single = query_value(&url, "single");
        {
            let mut q = url.query_pairs_mut();
            q.clear().append_pair("output", "csv");
            if let Some(gid) = &gid {
                q.append_pair("gid", gid);
            }
            if let Some(single) = &single {
                q.append_pair("single", single);
            }
        }
        return Ok(url);
    }

    let doc_path = EDITOR_PATH
        .captures(url.path())
        .map(|caps| caps[1].to_string());
    if let Some(doc_path) = doc_path {
        url.set_path(&format!("{}/export", doc_path));
        url.set_fragment(None);
        {
            let mut q = url.query_pairs_mut();
            q.clear().append_pair("format", "csv");
            if let Some(gid) = &gid {
                q.append_pair("gid", gid);
            }
        }
    }

    Ok(url)
}
