use crate::app::ports::EventSource;
use crate::config::{CategoryConfig, Config, SourceConfig};
use crate::error::{Result, ScraperError};
use crate::infra::http_client::{browser_client, ensure_success};
use crate::types::ListingPage;
use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, info, instrument};

/// Client for the Eventim search API, event pages and poster images.
pub struct EventimClient {
    client: Client,
    source: SourceConfig,
}

impl EventimClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: browser_client(&config.http)?,
            source: config.source.clone(),
        })
    }

    /// Search URL for one category page. `categories=null` is sent alongside
    /// the category name because the storefront does the same.
    pub fn listing_url(&self, category: &CategoryConfig, page: u32) -> Result<Url> {
        let page = page.to_string();
        Url::parse_with_params(
            &self.source.listing_url,
            &[
                ("webId", self.source.web_id.as_str()),
                ("language", self.source.language.as_str()),
                ("retail_partner", self.source.retail_partner.as_str()),
                ("categories", category.query.as_str()),
                ("categories", "null"),
                ("sort", "Recommendation"),
                ("in_stock", "true"),
                ("page", page.as_str()),
            ],
        )
        .map_err(|e| ScraperError::Config(format!("Invalid listing URL '{}': {}", self.source.listing_url, e)))
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("HTTP GET request to: {}", url);
        let resp = self.client.get(url).send().await?;
        ensure_success(resp)
    }
}

#[async_trait]
impl EventSource for EventimClient {
    #[instrument(skip(self, category), fields(category = %category.name))]
    async fn fetch_listing_page(&self, category: &CategoryConfig, page: u32) -> Result<ListingPage> {
        let url = self.listing_url(category, page)?;
        let body = self.get(url.as_str()).await?.text().await?;
        let listing: ListingPage = serde_json::from_str(&body)?;
        info!(
            "Fetched page {} for category {}: {} entries",
            page,
            category.name,
            listing.product_groups.len()
        );
        Ok(listing)
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<String> {
        let html = self.get(url).await?.text().await?;
        debug!("Fetched detail page {} ({} bytes)", url, html.len());
        Ok(html)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self.get(url).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
