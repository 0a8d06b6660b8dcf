// src/fetch/mod.rs

/// Sheet URL → CSV export URL.
pub mod urls;

/// HTTP download of the CSV payload.
pub mod sheet;

pub use sheet::{build_client, fetch_csv_text};
pub use urls::export_csv_url;
