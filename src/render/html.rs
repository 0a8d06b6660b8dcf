// src/render/html.rs
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::product::Product;
use crate::config::Storefront;

pub const NO_PRODUCTS: &str = "No products found.";
pub const LOAD_ERROR: &str = "Error loading products.";

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}

pub fn whatsapp_link(store: &Storefront, article: &str) -> String {
    format!(
        "https://wa.me/{}?text={}",
        encode_uri_component(&store.whatsapp_number),
        encode_uri_component(&format!("{}{}", store.message_prefix, article))
    )
}

fn js_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Status line shown in place of the cards.
pub fn message(msg: &str) -> String {
    format!("<div class=\"loading\">{}</div>", text(msg))
}

pub fn render_card(p: &Product, store: &Storefront) -> String {
    let src = p
        .pictures
        .first()
        .map(String::as_str)
        .unwrap_or(store.fallback_image.as_str());
    let onerror = format!(
        "this.onerror=null;this.src='{}';",
        js_single_quoted(&store.fallback_image)
    );

    format!(
        r#"
<div class="card">
  <img
    src="{src}"
    alt="{alt}"
    loading="lazy"
    decoding="async"
    referrerpolicy="no-referrer"
    onerror="{onerror}"
  />

  <div class="card-body">
    <h3>{article}</h3>
    <p><strong>Price:</strong> {currency}{rate}</p>
    <p><strong>Stock:</strong> {stock}</p>
    <p>{description}</p>

    <a class="btn-whatsapp" target="_blank"
       href="{href}">
      Buy on WhatsApp
    </a>
  </div>
</div>
"#,
        src = attr(src),
        alt = attr(&p.article),
        onerror = attr(&onerror),
        article = text(&p.article),
        currency = text(&store.currency),
        rate = text(&p.rate),
        stock = text(&p.stock),
        description = text(&p.description),
        href = attr(&whatsapp_link(store, &p.article)),
    )
}

pub fn render_cards(products: &[Product], store: &Storefront) -> String {
    products.iter().map(|p| render_card(p, store)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn product() -> Product {
        Product {
            article: "D-101 <Gold>".to_string(),
            rate: "450".to_string(),
            stock: "12".to_string(),
            description: "Cotton & silk \"blend\"".to_string(),
            pictures: vec![
                "https://lh3.googleusercontent.com/d/p1".to_string(),
                "https://lh3.googleusercontent.com/d/p2".to_string(),
            ],
        }
    }

    fn select<'a>(doc: &'a Html, css: &str) -> scraper::ElementRef<'a> {
        let sel = Selector::parse(css).unwrap();
        doc.select(&sel).next().unwrap()
    }

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(
            encode_uri_component("I want to buy this dhoti: D-1 (x)*!~'_."),
            "I%20want%20to%20buy%20this%20dhoti%3A%20D-1%20(x)*!~'_."
        );
        assert_eq!(encode_uri_component("a&b=c/₹"), "a%26b%3Dc%2F%E2%82%B9");
    }

    #[test]
    fn whatsapp_link_matches_storefront() {
        let store = Storefront::default();
        assert_eq!(
            whatsapp_link(&store, "D-7"),
            "https://wa.me/919629973204?text=I%20want%20to%20buy%20this%20dhoti%3A%20D-7"
        );
    }

    #[test]
    fn card_carries_product_fields() {
        let store = Storefront::default();
        let doc = Html::parse_fragment(&render_card(&product(), &store));

        let img = select(&doc, "div.card > img");
        assert_eq!(
            img.value().attr("src"),
            Some("https://lh3.googleusercontent.com/d/p1")
        );
        assert_eq!(img.value().attr("alt"), Some("D-101 <Gold>"));
        assert_eq!(img.value().attr("loading"), Some("lazy"));
        assert_eq!(
            img.value().attr("onerror"),
            Some("this.onerror=null;this.src='Logo.jpeg';")
        );

        let h3 = select(&doc, ".card-body h3");
        assert_eq!(h3.text().collect::<String>(), "D-101 <Gold>");

        let paras: Vec<String> = doc
            .select(&Selector::parse(".card-body p").unwrap())
            .map(|p| p.text().collect())
            .collect();
        assert_eq!(paras[0], "Price: ₹450");
        assert_eq!(paras[1], "Stock: 12");
        assert_eq!(paras[2], "Cotton & silk \"blend\"");

        let link = select(&doc, "a.btn-whatsapp");
        assert_eq!(
            link.value().attr("href"),
            Some("https://wa.me/919629973204?text=I%20want%20to%20buy%20this%20dhoti%3A%20D-101%20%3CGold%3E")
        );
        assert_eq!(link.value().attr("target"), Some("_blank"));
    }

    #[test]
    fn markup_in_cells_is_escaped() {
        let html = render_card(&product(), &Storefront::default());
        assert!(html.contains("<h3>D-101 &lt;Gold&gt;</h3>"));
        assert!(html.contains("<p>Cotton &amp; silk"));
    }

    #[test]
    fn fallback_image_when_no_pictures() {
        let store = Storefront {
            fallback_image: "img/it's.png".to_string(),
            ..Storefront::default()
        };
        let p = Product {
            article: "D-2".to_string(),
            ..Product::default()
        };
        let doc = Html::parse_fragment(&render_card(&p, &store));
        let img = select(&doc, "img");
        assert_eq!(img.value().attr("src"), Some("img/it's.png"));
        assert_eq!(
            img.value().attr("onerror"),
            Some("this.onerror=null;this.src='img/it\\'s.png';")
        );
    }

    #[test]
    fn cards_concatenate_in_order() {
        let a = Product {
            article: "A".to_string(),
            ..Product::default()
        };
        let b = Product {
            article: "B".to_string(),
            ..Product::default()
        };
        let doc = Html::parse_fragment(&render_cards(&[a, b], &Storefront::default()));
        let names: Vec<String> = doc
            .select(&Selector::parse("h3").unwrap())
            .map(|h| h.text().collect())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(render_cards(&[], &Storefront::default()), "");
    }

    #[test]
    fn message_is_escaped() {
        assert_eq!(message(NO_PRODUCTS), "<div class=\"loading\">No products found.</div>");
        assert_eq!(message("a<b"), "<div class=\"loading\">a&lt;b</div>");
    }
}
