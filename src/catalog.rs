// src/catalog.rs
use anyhow::{Context, Result};
use chrono::Utc;
use futures::{stream::FuturesUnordered, StreamExt};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

use crate::config::{FetchSettings, Settings, SheetConfig, Storefront};
use crate::fetch::{build_client, export_csv_url, fetch_csv_text};
use crate::parse::parse;
use crate::render::{
    default_template, fill_container, message, products, render_cards, Product, LOAD_ERROR,
    NO_PRODUCTS,
};

/// Rendered contents for one sheet's container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSection {
    pub container_id: String,
    pub html: String,
    pub products: usize,
}

/// Fetch one sheet and turn its rows into products.
#[instrument(level = "info", skip(client, sheet, fetch), fields(container = %sheet.container_id))]
pub async fn load_products(
    client: &Client,
    sheet: &SheetConfig,
    fetch: &FetchSettings,
) -> Result<Vec<Product>> {
    let url = export_csv_url(&sheet.url)?;
    let text = fetch_csv_text(client, &url, fetch)
        .await
        .with_context(|| format!("fetching sheet {}", sheet.container_id))?;
    let table = parse(&text);
    info!(rows = table.len(), "parsed sheet");
    Ok(products(&table))
}

/// Cards, or the message shown in their place. Errors end here.
pub fn render_sheet(
    container_id: &str,
    loaded: Result<Vec<Product>>,
    store: &Storefront,
) -> SheetSection {
    let (html, count) = match loaded {
        Ok(items) if items.is_empty() => {
            info!(container = %container_id, "no products");
            (message(NO_PRODUCTS), 0)
        }
        Ok(items) => (render_cards(&items, store), items.len()),
        Err(e) => {
            error!(container = %container_id, error = ?e, "loading sheet failed");
            (message(LOAD_ERROR), 0)
        }
    };
    SheetSection {
        container_id: container_id.to_string(),
        html,
        products: count,
    }
}

/// Load every configured sheet, at most `fetch.max_concurrency` at a time.
/// Sections come back in configuration order.
pub async fn build_catalog(client: &Client, settings: &Settings) -> Vec<SheetSection> {
    let mut tasks = FuturesUnordered::new();
    let mut sections = Vec::with_capacity(settings.sheets.len());

    for (i, sheet) in settings.sheets.iter().enumerate() {
        tasks.push(async move {
            let loaded = load_products(client, sheet, &settings.fetch).await;
            (i, render_sheet(&sheet.container_id, loaded, &settings.storefront))
        });

        // throttle concurrency
        if tasks.len() >= settings.fetch.max_concurrency {
            if let Some(done) = tasks.next().await {
                sections.push(done);
            }
        }
    }

    // drain remaining tasks
    while let Some(done) = tasks.next().await {
        sections.push(done);
    }

    sections.sort_by_key(|(i, _)| *i);
    sections.into_iter().map(|(_, s)| s).collect()
}

/// Drop every section into its container. Uses a generated page when no
/// template is given.
pub fn assemble_page(
    settings: &Settings,
    sections: &[SheetSection],
    template: Option<&str>,
) -> Result<String> {
    let mut page = match template {
        Some(t) => t.to_string(),
        None => default_template(&settings.sheets, Utc::now()),
    };
    for section in sections {
        page = fill_container(&page, &section.container_id, &section.html)?;
    }
    Ok(page)
}

async fn write_page(path: &Path, page: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, page)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

/// Full run: fetch all sheets, render, write the page. Returns the output path.
#[instrument(level = "info", skip(settings))]
pub async fn run(settings: &Settings) -> Result<PathBuf> {
    let template = match &settings.template {
        Some(path) => Some(
            fs::read_to_string(path)
                .await
                .with_context(|| format!("reading template {}", path.display()))?,
        ),
        None => None,
    };

    let client = build_client(&settings.fetch)?;
    let sections = build_catalog(&client, settings).await;
    let total: usize = sections.iter().map(|s| s.products).sum();

    let page = assemble_page(settings, &sections, template.as_deref())?;
    write_page(&settings.output, &page).await?;

    info!(
        sheets = sections.len(),
        products = total,
        output = %settings.output.display(),
        "catalog written"
    );
    Ok(settings.output.clone())
}
