use crate::config::CategoryConfig;
use crate::error::Result;
use crate::organizer::{RegisterOutcome, Registration};
use crate::publish::EventForm;
use crate::types::ListingPage;
use async_trait::async_trait;
use std::path::Path;

/// Listing endpoint, detail pages and poster images of the ticketing site.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch_listing_page(&self, category: &CategoryConfig, page: u32) -> Result<ListingPage>;
    async fn fetch_detail_page(&self, url: &str) -> Result<String>;
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>>;
}

/// User registration and login on the local API.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, registration: &Registration) -> RegisterOutcome;
    /// Returns the session token, or `None` on any failure.
    async fn login(&self, email: &str, password: &str) -> Option<String>;
}

/// Event submission on the local API.
#[async_trait]
pub trait PublishApi: Send + Sync {
    /// Returns the API response body, or `None` on transport or HTTP errors.
    async fn publish(
        &self,
        form: &EventForm,
        image: Option<&Path>,
        token: Option<&str>,
    ) -> Option<serde_json::Value>;
}
