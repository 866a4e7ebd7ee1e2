use super::element_text;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static PRICE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".stage-price").expect("valid price selector"));

// Euro sign followed by a decimal with comma separator, e.g. "€ 12,50"
static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"€\s*(\d+(?:,\d+)?)").expect("valid price pattern"));

/// Returns the numeric part of the displayed price, keeping the comma.
pub fn extract_price(document: &Html) -> Option<String> {
    let element = document.select(&PRICE_SELECTOR).next()?;
    let text = element_text(&element);
    PRICE_PATTERN
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
