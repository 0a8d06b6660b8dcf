pub mod html;
pub mod page;
pub mod product;

pub use html::{message, render_cards, LOAD_ERROR, NO_PRODUCTS};
pub use page::{default_template, fill_container};
pub use product::{products, Columns, Product};
