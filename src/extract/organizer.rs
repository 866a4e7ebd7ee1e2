use super::{element_text, non_empty};
use crate::constants::DEFAULT_ORGANIZER;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

static SUBSCRIPTION_LABEL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(".evi-widget-subscription form label.evi-widget-label-email")
        .expect("valid subscription label selector")
});
static SCRIPT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"script[type="text/javascript"]"#).expect("valid script selector")
});
static OG_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:title"]"#).expect("valid og:title selector")
});
static HEADLINE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".stage-headline").expect("valid headline selector"));

static SUBSCRIPTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Prijavite se na e-novičke za izvajalca: (.*?)$").expect("valid subscription pattern")
});
static ORGANIZER_IDS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""event_series_organizer_ids":\[(.*?)\]"#).expect("valid organizer ids pattern")
});
static ARTIST_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""artist_name":"(.*?)""#).expect("valid artist name pattern"));
static SERIES_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""event_series_name":"(.*?)""#).expect("valid series name pattern")
});

const ORGANIZER_IDS_KEY: &str = "event_series_organizer_ids";
const TITLE_SEPARATOR: &str = " - ";

/// Finds the performer or organizer credited on the page.
///
/// Sources are tried in order and the first non-empty answer wins:
/// the newsletter subscription label, the tracking data in inline scripts,
/// the `og:title` meta tag and finally the stage headline. Pages without any
/// of these fall back to [`DEFAULT_ORGANIZER`].
pub fn extract_organizer(document: &Html) -> String {
    from_subscription_label(document)
        .or_else(|| from_tracking_script(document))
        .or_else(|| from_og_title(document))
        .or_else(|| from_headline(document))
        .unwrap_or_else(|| DEFAULT_ORGANIZER.to_string())
}

fn from_subscription_label(document: &Html) -> Option<String> {
    let label = document.select(&SUBSCRIPTION_LABEL_SELECTOR).next()?;
    let text = element_text(&label);
    let caps = SUBSCRIPTION_PATTERN.captures(&text)?;
    non_empty(caps.get(1)?.as_str().trim().to_string())
}

fn from_tracking_script(document: &Html) -> Option<String> {
    for script in document.select(&SCRIPT_SELECTOR) {
        let body = script.text().collect::<String>();
        if !body.contains(ORGANIZER_IDS_KEY) {
            continue;
        }
        let Some(ids) = ORGANIZER_IDS_PATTERN.captures(&body).and_then(|c| c.get(1)) else {
            continue;
        };
        let ids = ids.as_str().trim();
        debug!("Found organizer ids: {}", ids);
        if ids.is_empty() {
            continue;
        }
        // Single-artist events carry the artist name; multi-artist events only
        // the series name.
        let name = capture(&ARTIST_NAME_PATTERN, &body).or_else(|| capture(&SERIES_NAME_PATTERN, &body));
        if name.is_some() {
            return name;
        }
    }
    None
}

fn from_og_title(document: &Html) -> Option<String> {
    let meta = document.select(&OG_TITLE_SELECTOR).next()?;
    let content = meta.value().attr("content")?;
    non_empty(first_title_segment(content))
}

fn from_headline(document: &Html) -> Option<String> {
    let headline = document.select(&HEADLINE_SELECTOR).next()?;
    non_empty(first_title_segment(&element_text(&headline)))
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|c| c.get(1))
        .and_then(|m| non_empty(m.as_str().to_string()))
}

/// "Artist - Tour 2025" -> "Artist"; strings without the separator are kept whole.
fn first_title_segment(title: &str) -> String {
    title
        .split(TITLE_SEPARATOR)
        .next()
        .unwrap_or(title)
        .trim()
        .to_string()
}
