//! Form schema of `POST /dogodki` on the local events API.

use crate::types::EventRecord;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::Path;

pub const API_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
pub const IMAGE_FIELD: &str = "slika";

/// Address object the API expects JSON-encoded in the `naslov` field.
#[derive(Debug, Serialize)]
struct Address<'a> {
    ulica: &'a str,
    hisna_stevilka: &'a str,
    postna_stevilka: &'a str,
    obcina: &'a str,
}

/// Text fields of one event submission, in the API's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub timestamp: String,
    pub description: String,
    pub address_json: String,
    pub category_id: String,
    pub price: String,
    pub promoted: String,
    pub source_url: String,
}

impl EventForm {
    pub fn from_record(record: &EventRecord, now: NaiveDateTime) -> Self {
        let address_json = match record.location {
            Some(_) => serde_json::to_string(&Address {
                ulica: record.venue(),
                hisna_stevilka: "",
                postna_stevilka: "",
                obcina: record.city(),
            })
            .unwrap_or_else(|_| "{}".to_string()),
            None => "{}".to_string(),
        };
        Self {
            title: record.title.clone(),
            timestamp: normalize_timestamp(record.start_date.as_deref(), now),
            description: record.description.clone(),
            address_json,
            category_id: record.category_id.clone(),
            price: record.price.clone(),
            promoted: "0".to_string(),
            source_url: record.source_url.clone(),
        }
    }

    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("naslov_dogodka", self.title.clone()),
            ("cas", self.timestamp.clone()),
            ("opis", self.description.clone()),
            ("naslov", self.address_json.clone()),
            ("tip_dogodka", self.category_id.clone()),
            ("cena", self.price.clone()),
            ("je_promoviran", self.promoted.clone()),
            ("eventim_url", self.source_url.clone()),
        ]
    }
}

/// Reformats the listing's start date as `%Y-%m-%dT%H:%M:%S` in the
/// event's own wall-clock time. Unparsable input is passed through as is;
/// a missing date becomes `now`.
pub fn normalize_timestamp(raw: Option<&str>, now: NaiveDateTime) -> String {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return now.format(API_TIMESTAMP_FORMAT).to_string(),
    };
    parse_start_date(raw)
        .map(|dt| dt.format(API_TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_start_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Only JPEG and PNG are distinguished; anything else is sent as PNG.
pub fn image_content_type(path: &Path) -> &'static str {
    let name = path.to_string_lossy().to_lowercase();
    if name.ends_with(".jpg") || name.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "image/png"
    }
}
