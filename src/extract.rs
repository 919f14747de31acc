use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Structural identifiers for the product page layout being tracked.
pub const TITLE_SELECTOR: &str = "#productTitle";
pub const PRICE_SELECTOR: &str = "span.a-price-whole";

/// Title and price pulled from one page fetch. Not retained between checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub price: i64,
}

impl Listing {
    /// A listing triggers a notification when its price is at or below
    /// the target (<=, not <).
    pub fn at_or_below(&self, target_price: i64) -> bool {
        self.price <= target_price
    }
}

/// Locates the title and price elements in a fetched page.
pub struct ListingExtractor {
    title_selector: Selector,
    price_selector: Selector,
}

impl ListingExtractor {
    pub fn new() -> Self {
        Self {
            title_selector: Selector::parse(TITLE_SELECTOR).unwrap(),
            price_selector: Selector::parse(PRICE_SELECTOR).unwrap(),
        }
    }

    /// Parse the page and return the listing, or fail if either element
    /// is missing. First match wins for each selector.
    pub fn extract(&self, html: &str) -> Result<Listing> {
        let document = Html::parse_document(html);

        let title_el = document
            .select(&self.title_selector)
            .next()
            .ok_or_else(|| AppError::ElementNotFound {
                selector: TITLE_SELECTOR.to_string(),
            })?;

        let price_el = document
            .select(&self.price_selector)
            .next()
            .ok_or_else(|| AppError::ElementNotFound {
                selector: PRICE_SELECTOR.to_string(),
            })?;

        let title = title_el.text().collect::<Vec<_>>().join(" ").trim().to_string();
        let price_text = price_el.text().collect::<Vec<_>>().join(" ").trim().to_string();
        let price = parse_price(&price_text)?;

        Ok(Listing { title, price })
    }
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a displayed price into the smallest reported currency unit.
///
/// Strips exactly commas and periods, then parses the remaining digits as
/// one integer: "1,499" -> 1499, "1,23,999.00" -> 123999. Locales with a
/// different decimal convention will mis-parse silently; callers track
/// target prices in the same unit convention as the pages they watch.
pub fn parse_price(text: &str) -> Result<i64> {
    let cleaned = text.replace(',', "").replace('.', "");
    cleaned
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::Parse {
            message: format!("price text is not an integer: {:?}", text),
        })
}
