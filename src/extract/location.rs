use super::element_text;
use crate::types::Location;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static ITEM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-listing-item").expect("valid listing item selector"));
static VENUE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-listing-venue").expect("valid venue selector"));
static CITY_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".event-listing-event").expect("valid city selector"));

/// Reads venue and city from the first event listing item on the page.
pub fn extract_location(document: &Html) -> Option<Location> {
    let item = document.select(&ITEM_SELECTOR).next()?;
    let location = Location {
        venue: item.select(&VENUE_SELECTOR).next().map(|e| element_text(&e)),
        city: item.select(&CITY_SELECTOR).next().map(|e| element_text(&e)),
    };
    if location.venue.is_none() && location.city.is_none() {
        return None;
    }
    Some(location)
}
