// src/render/page.rs
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use regex::Regex;

use crate::config::SheetConfig;

/// Bare page with one empty container per sheet.
pub fn default_template(sheets: &[SheetConfig], generated_at: DateTime<Utc>) -> String {
    let mut sections = String::new();
    for sheet in sheets {
        sections.push_str("<section>\n");
        if let Some(title) = &sheet.title {
            sections.push_str(&format!("  <h2>{}</h2>\n", text(title)));
        }
        sections.push_str(&format!(
            "  <div id=\"{}\" class=\"catalog\"></div>\n</section>\n",
            attr(&sheet.container_id)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Catalog</title>
</head>
<body>
<!-- generated {} -->
{}</body>
</html>
"#,
        generated_at.to_rfc3339(),
        sections
    )
}

/// Replace the contents of the element whose `id` is `container_id`.
///
/// Nested elements of the same tag are balanced, so whatever placeholder the
/// container holds is dropped whole.
pub fn fill_container(page: &str, container_id: &str, inner_html: &str) -> Result<String> {
    // id="…", id='…' or a bare id=… ended by whitespace, `/` or `>`
    let id = regex::escape(container_id);
    let open = Regex::new(&format!(
        r#"<([A-Za-z][A-Za-z0-9-]*)(?:\s[^>]*)?\s(?i:id)\s*=\s*(?:"{id}"[^>]*|'{id}'[^>]*|{id}(?:[\s/][^>]*)?)>"#,
    ))
    .context("building container pattern")?;

    let caps = open
        .captures(page)
        .ok_or_else(|| anyhow!("container #{} not found in page", container_id))?;
    let open_end = caps
        .get(0)
        .map(|m| m.end())
        .ok_or_else(|| anyhow!("container #{} not found in page", container_id))?;

    let tags = Regex::new(&format!(r"(?i)<(/?){}(?:\s[^>]*)?>", regex::escape(&caps[1])))
        .context("building tag pattern")?;
    let mut depth = 1usize;
    let mut close_start = None;
    for m in tags.captures_iter(&page[open_end..]) {
        let Some(whole) = m.get(0) else { continue };
        if !m[1].is_empty() {
            depth -= 1;
            if depth == 0 {
                close_start = Some(open_end + whole.start());
                break;
            }
        } else if !whole.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    let close_start =
        close_start.ok_or_else(|| anyhow!("container #{} is never closed", container_id))?;

    Ok(format!(
        "{}{}{}",
        &page[..open_end],
        inner_html,
        &page[close_start..]
    ))
}
