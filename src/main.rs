use anyhow::Result;
use sheetcatalog::{
    catalog,
    config::{Settings, DEFAULT_CONFIG_PATH},
    init_logging,
};
use std::{env, path::PathBuf, process::exit};
use tracing::info;

const USAGE: &str = "Usage: sheetcatalog [CONFIG]\n\n\
Fetches every sheet listed in CONFIG (default catalog.yaml), renders the\n\
product cards and writes the page to the configured output.\n\
Env: CATALOG_OUTPUT overrides the output path, LOG_LEVEL / RUST_LOG set logging.";

#[tokio::main]
async fn main() -> Result<()> {
    let arg = env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h" | "--help")) {
        eprintln!("{}", USAGE);
        exit(0);
    }

    // ─── 1) init logging ─────────────────────────────────────────────
    init_logging();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config_path = arg
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let settings = Settings::load(&config_path)?;

    // ─── 3) fetch, render, write ─────────────────────────────────────
    let output = catalog::run(&settings).await?;

    info!(output = %output.display(), "all done");
    Ok(())
}
