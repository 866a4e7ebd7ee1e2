//! Field extractors for Eventim detail pages.
//!
//! Every extractor reads a parsed document and returns `None` when the field
//! is missing; none of them fail.

pub mod description;
pub mod location;
pub mod organizer;
pub mod price;

pub use description::extract_description;
pub use location::extract_location;
pub use organizer::extract_organizer;
pub use price::extract_price;

use crate::types::Location;
use scraper::{ElementRef, Html};
use serde::Serialize;

/// All fields read from one detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailFields {
    pub price: Option<String>,
    pub description: Option<String>,
    pub location: Option<Location>,
    pub organizer: String,
}

/// Parses the HTML and runs every extractor. The document is dropped before
/// returning so callers never hold it across an await point.
pub fn parse_detail_page(html: &str) -> DetailFields {
    let document = Html::parse_document(html);
    DetailFields {
        price: extract_price(&document),
        description: extract_description(&document),
        location: extract_location(&document),
        organizer: extract_organizer(&document),
    }
}

pub(crate) fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub(crate) fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
