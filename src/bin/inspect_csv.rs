use anyhow::{Context, Result};
use sheetcatalog::{
    config::FetchSettings,
    fetch::{build_client, export_csv_url, fetch_csv_text},
    init_logging,
    parse::parse,
};
use std::{env, process::exit};
use tracing::info;

/// The single source argument, or the usage line when there isn't exactly one.
fn source_arg(mut args: impl Iterator<Item = String>) -> Result<String, String> {
    let program = args.next().unwrap_or_else(|| "inspect_csv".to_string());
    match (args.next(), args.next()) {
        (Some(source), None) => Ok(source),
        _ => Err(format!("Usage: {} <CSV_FILE | SHEET_URL>", program)),
    }
}

/// Parse a CSV file or sheet URL and print the table as JSON.
#[tokio::main]
async fn main() -> Result<()> {
    let source = match source_arg(env::args()) {
        Ok(source) => source,
        Err(usage) => {
            eprintln!("{}", usage);
            exit(1);
        }
    };
    init_logging();

    let text = if source.starts_with("http://") || source.starts_with("https://") {
        let settings = FetchSettings::default();
        let client = build_client(&settings)?;
        let url = export_csv_url(&source)?;
        info!(%url, "fetching");
        fetch_csv_text(&client, &url, &settings).await?
    } else {
        tokio::fs::read_to_string(&source)
            .await
            .with_context(|| format!("reading {}", source))?
    };

    let table = parse(&text);
    println!("{}", serde_json::to_string_pretty(&table)?);

    let widths: Vec<usize> = table.rows().iter().map(|r| r.len()).collect();
    eprintln!(
        "{} rows ({} data), header: {:?}, widths {}..={}",
        table.len(),
        table.data_rows().len(),
        table.header().map(|h| h.fields()).unwrap_or_default(),
        widths.iter().min().copied().unwrap_or(0),
        widths.iter().max().copied().unwrap_or(0),
    );
    Ok(())
}
