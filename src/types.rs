use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One page of the category search endpoint. Entries stay raw JSON so a
/// malformed one can be rejected on its own.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListingPage {
    pub total_pages: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_groups: Vec<Value>,
}

/// A listing entry that could not be read as a [`ProductSummary`].
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    /// The entry's `name`, when it has a string one
    pub name: Option<String>,
    pub reason: String,
}

impl RejectedEntry {
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed listing entry>")
    }
}

impl ListingPage {
    /// Converts every entry independently, keeping listing order.
    pub fn into_entries(self) -> Vec<Result<ProductSummary, RejectedEntry>> {
        self.product_groups
            .into_iter()
            .map(|raw| {
                let name = raw.get("name").and_then(Value::as_str).map(str::to_string);
                serde_json::from_value::<ProductSummary>(raw).map_err(|e| RejectedEntry {
                    name,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

/// Listing entry for a single event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<ProductCategory>,
    pub link: String,
    /// Local API category id of the listing this item came from
    #[serde(skip)]
    pub assigned_category_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductCategory {
    pub name: String,
}

impl ProductSummary {
    /// Name of the first source category, used for logging only.
    pub fn primary_category(&self) -> &str {
        self.categories
            .first()
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown")
    }
}

/// Treats an explicit `null` like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Venue and city read from the detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub venue: Option<String>,
    pub city: Option<String>,
}

/// Everything the publisher needs for one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub title: String,
    pub description: String,
    pub start_date: Option<String>,
    pub price: String,
    pub location: Option<Location>,
    pub category_id: String,
    pub source_url: String,
}

impl EventRecord {
    pub fn venue(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.venue.as_deref())
            .unwrap_or("")
    }

    pub fn city(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|l| l.city.as_deref())
            .unwrap_or("")
    }
}

/// A registered organizer account, one ledger entry each.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrganizerCredential {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub token: Option<String>,
}
