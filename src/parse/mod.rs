pub mod csv;
pub mod table;

pub use csv::parse;
pub use table::{Row, Table};
