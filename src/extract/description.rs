use super::element_text;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TEASER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".moretext-teaser").expect("valid teaser selector"));
static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("valid paragraph selector"));

/// Joins the paragraphs of the expandable description block with newlines.
pub fn extract_description(document: &Html) -> Option<String> {
    let container = document.select(&TEASER_SELECTOR).next()?;
    let paragraphs: Vec<String> = container
        .select(&PARAGRAPH_SELECTOR)
        .map(|p| element_text(&p))
        .collect();
    if paragraphs.is_empty() {
        return None;
    }
    Some(paragraphs.join("\n"))
}
