//! Merchant page scraping: name, bio, and inventory table.

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

/// One row of a merchant's inventory table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantItem {
    pub name: String,
    pub price: String,
}

/// A merchant scraped from a location page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Merchant {
    pub name: String,
    /// Inner HTML of the paragraph immediately following the name heading.
    pub bio_html: String,
    pub items: Vec<MerchantItem>,
}

/// Scrape merchant data out of a location page.
///
/// Returns `None` when the page has no content container or no `<h3>`
/// merchant name — the page is simply not a merchant page.
pub fn extract_merchant(html: &str) -> Option<Merchant> {
    let doc = Html::parse_document(html);
    let container_sel = Selector::parse("#entity-container").unwrap();
    let container = doc.select(&container_sel).next()?;

    let h3_sel = Selector::parse("h3").unwrap();
    let name_el = container.select(&h3_sel).next()?;
    let name = name_el.text().collect::<String>().trim().to_string();
    if name.is_empty() {
        return None;
    }

    // The bio is assumed to be the paragraph immediately following the name.
    let bio_html = name_el
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|el| el.value().name() == "p")
        .map(|el| el.inner_html())
        .unwrap_or_default();

    let mut items = Vec::new();
    let table_sel = Selector::parse("table").unwrap();
    if let Some(table) = container.select(&table_sel).next() {
        let row_sel = Selector::parse("tbody tr").unwrap();
        let cell_sel = Selector::parse("td").unwrap();
        for row in table.select(&row_sel) {
            let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
            if cells.len() < 2 {
                continue;
            }
            let item_name = cells[0].text().collect::<String>().trim().to_string();
            let price = cells[1].text().collect::<String>().trim().to_string();
            if !item_name.is_empty() {
                items.push(MerchantItem {
                    name: item_name,
                    price,
                });
            }
        }
    }

    Some(Merchant {
        name,
        bio_html,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_bio_and_items() {
        let html = r#"<div id="entity-container">
            <h3>Mirna the Tinker</h3>
            <p>Sells <em>oddities</em> from a cart.</p>
            <table><tbody>
                <tr><td>Rope (50ft)</td><td>1 gp</td></tr>
                <tr><td>Lantern</td><td>5 gp</td></tr>
                <tr><td></td><td>99 gp</td></tr>
                <tr><td>lonely cell</td></tr>
            </tbody></table>
        </div>"#;

        let merchant = extract_merchant(html).expect("merchant");
        assert_eq!(merchant.name, "Mirna the Tinker");
        assert_eq!(merchant.bio_html, "Sells <em>oddities</em> from a cart.");
        assert_eq!(merchant.items.len(), 2);
        assert_eq!(merchant.items[0].name, "Rope (50ft)");
        assert_eq!(merchant.items[1].price, "5 gp");
    }

    #[test]
    fn non_merchant_page_returns_none() {
        let html = r#"<div id="entity-container"><p>Just a hex.</p></div>"#;
        assert!(extract_merchant(html).is_none());
    }

    #[test]
    fn merchant_without_bio_or_table() {
        let html = r#"<div id="entity-container"><h3>Silent Bob</h3><div>not a p</div></div>"#;
        let merchant = extract_merchant(html).expect("merchant");
        assert_eq!(merchant.name, "Silent Bob");
        assert!(merchant.bio_html.is_empty());
        assert!(merchant.items.is_empty());
    }
}
