// src/render/product.rs
use tracing::{debug, warn};

use crate::images::normalize_pictures;
use crate::parse::{Row, Table};

pub const ARTICLE_NUMBER: &str = "Article Number";
pub const RATE: &str = "Rate";
pub const STOCK: &str = "Stock";
pub const DESCRIPTION: &str = "Description";
pub const PICTURES: [&str; 3] = ["Picture 1", "Picture 2", "Picture 3"];

/// Header positions of the columns a card is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns {
    pub article: Option<usize>,
    pub rate: Option<usize>,
    pub stock: Option<usize>,
    pub description: Option<usize>,
    pub pictures: [Option<usize>; 3],
}

impl Columns {
    pub fn locate(header: &Row) -> Self {
        Columns {
            article: header.position(ARTICLE_NUMBER),
            rate: header.position(RATE),
            stock: header.position(STOCK),
            description: header.position(DESCRIPTION),
            pictures: PICTURES.map(|name| header.position(name)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Product {
    pub article: String,
    pub rate: String,
    pub stock: String,
    pub description: String,
    /// Direct image URLs, unusable links already dropped.
    pub pictures: Vec<String>,
}

impl Product {
    /// `None` when the row has no article number.
    pub fn from_row(row: &Row, cols: &Columns) -> Option<Self> {
        let article = row.get(cols.article);
        if article.is_empty() {
            return None;
        }
        Some(Product {
            article: article.to_string(),
            rate: row.get(cols.rate).to_string(),
            stock: row.get(cols.stock).to_string(),
            description: row.get(cols.description).to_string(),
            pictures: normalize_pictures(cols.pictures.iter().map(|&i| row.get(i))),
        })
    }
}

/// Every data row with an article number, in sheet order.
pub fn products(table: &Table) -> Vec<Product> {
    let Some(header) = table.header() else {
        return Vec::new();
    };
    let cols = Columns::locate(header);
    if cols.article.is_none() {
        warn!(header = ?header.fields(), "no {:?} column", ARTICLE_NUMBER);
        return Vec::new();
    }

    let out: Vec<Product> = table
        .data_rows()
        .iter()
        .filter_map(|row| Product::from_row(row, &cols))
        .collect();
    debug!(
        rows = table.data_rows().len(),
        products = out.len(),
        "extracted products"
    );
    out
}
