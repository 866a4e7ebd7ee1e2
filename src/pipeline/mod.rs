//! Category listings → detail pages → organizer → publish, one event at a time.

pub mod images;
pub mod listing;

pub use images::TempImages;
pub use listing::{collect_products, CollectedListings};

use crate::app::ports::{AuthApi, EventSource, PublishApi};
use crate::config::Config;
use crate::constants::{DESCRIPTION_NOT_FOUND, PRICE_NOT_FOUND};
use crate::error::Result;
use crate::extract::{parse_detail_page, DetailFields};
use crate::ledger::{OrganizerLedger, ProcessedEvents};
use crate::organizer::OrganizerResolver;
use crate::publish::EventForm;
use crate::types::{EventRecord, ProductSummary};
use metrics::counter;
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};

/// Result of a complete pipeline run
#[derive(Debug, Default, Serialize)]
pub struct PipelineResult {
    pub total_events: usize,
    pub published_events: usize,
    pub skipped_events: usize,
    pub failed_events: usize,
    pub errors: Vec<String>,
}

/// What happened to one listed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Published,
    /// Already in the processed ledger
    Skipped,
    /// The API rejected the event; it stays eligible for the next run
    PublishFailed,
    /// The API accepted the event but the processed ledger write failed,
    /// so the next run will submit it again
    PublishedNotRecorded,
}

pub struct Pipeline {
    config: Config,
    source: Arc<dyn EventSource>,
    auth: Arc<dyn AuthApi>,
    publisher: Arc<dyn PublishApi>,
    processed: ProcessedEvents,
    organizers: OrganizerLedger,
    images: TempImages,
}

impl Pipeline {
    pub fn new(
        config: Config,
        source: Arc<dyn EventSource>,
        auth: Arc<dyn AuthApi>,
        publisher: Arc<dyn PublishApi>,
        processed: ProcessedEvents,
        organizers: OrganizerLedger,
    ) -> Self {
        let images = TempImages::new(config.storage.temp_image_dir.clone());
        Self {
            config,
            source,
            auth,
            publisher,
            processed,
            organizers,
            images,
        }
    }

    /// Collects every category listing, then processes the events in order.
    /// Listing fetch failures abort the run. Unreadable listing entries and
    /// per-event failures are recorded and the loop moves on.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<PipelineResult> {
        info!("🚀 Starting Eventim pipeline");
        let listings = collect_products(self.source.as_ref(), &self.config.source.categories).await?;
        let products = listings.products;

        let mut result = PipelineResult {
            total_events: products.len() + listings.rejected.len(),
            failed_events: listings.rejected.len(),
            ..Default::default()
        };
        for rejected in &listings.rejected {
            result.errors.push(format!(
                "Unreadable listing entry '{}': {}",
                rejected.label(),
                rejected.reason
            ));
        }
        if products.is_empty() {
            warn!("No readable events found in any category listing");
            counter!("eventim_events_failed_total").increment(result.failed_events as u64);
            return Ok(result);
        }

        for (i, product) in products.iter().enumerate() {
            let span = info_span!("event", index = i + 1, title = %product.name);
            info!("Processing event {}/{}: {}", i + 1, products.len(), product.name);
            match self.process_product(product).instrument(span).await {
                Ok(ItemOutcome::Published) => result.published_events += 1,
                Ok(ItemOutcome::Skipped) => result.skipped_events += 1,
                Ok(ItemOutcome::PublishFailed) => {
                    result.failed_events += 1;
                    result.errors.push(format!("Publishing '{}' failed", product.name));
                }
                Ok(ItemOutcome::PublishedNotRecorded) => {
                    result.published_events += 1;
                    result.errors.push(format!(
                        "Published '{}' but could not mark it as processed",
                        product.name
                    ));
                }
                Err(e) => {
                    error!("Error processing event {}: {}", product.name, e);
                    result.failed_events += 1;
                    result.errors.push(format!("Failed to process '{}': {}", product.name, e));
                }
            }
            if i + 1 < products.len() {
                self.politeness_delay().await;
            }
        }

        counter!("eventim_events_published_total").increment(result.published_events as u64);
        counter!("eventim_events_skipped_total").increment(result.skipped_events as u64);
        counter!("eventim_events_failed_total").increment(result.failed_events as u64);
        info!(
            "✅ Processed {} events ({} published, {} skipped, {} failed)",
            result.total_events, result.published_events, result.skipped_events, result.failed_events
        );
        Ok(result)
    }

    /// Runs one listed event through download, extraction, organizer
    /// resolution and publishing. The poster is deleted once the API has
    /// accepted the event or on an error, and kept when the API rejects it.
    pub async fn process_product(&self, product: &ProductSummary) -> Result<ItemOutcome> {
        if self.processed.is_processed(&product.name)? {
            info!("Event '{}' has already been processed, skipping", product.name);
            return Ok(ItemOutcome::Skipped);
        }
        debug!(
            "Category {} (local id {}), link {}",
            product.primary_category(),
            product.assigned_category_id,
            product.link
        );

        let image = self.download_image(product).await;

        let published = match self.publish_product(product, image.as_deref()).await {
            Ok(published) => published,
            Err(e) => {
                if let Some(path) = &image {
                    self.images.delete(path);
                }
                return Err(e);
            }
        };
        if !published {
            warn!("Failed to create event '{}' in the API", product.name);
            return Ok(ItemOutcome::PublishFailed);
        }

        if let Some(path) = &image {
            self.images.delete(path);
        }
        match self.processed.mark_processed(&product.name) {
            Ok(()) => Ok(ItemOutcome::Published),
            Err(e) => {
                error!("Published '{}' but failed to record it: {}", product.name, e);
                Ok(ItemOutcome::PublishedNotRecorded)
            }
        }
    }

    async fn download_image(&self, product: &ProductSummary) -> Option<PathBuf> {
        let url = product.image_url.as_deref().filter(|u| !u.is_empty())?;
        let path = self.images.path_for(&product.name, url);
        info!("Downloading image from: {}", url);
        let saved = match self.source.fetch_image(url).await {
            Ok(bytes) => self.images.save(&path, &bytes),
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("Error downloading image: {}", e);
                None
            }
        }
    }

    /// Returns whether the API accepted the event.
    async fn publish_product(&self, product: &ProductSummary, image: Option<&Path>) -> Result<bool> {
        let html = self.source.fetch_detail_page(&product.link).await?;
        let fields = parse_detail_page(&html);
        info!("Event organizer: {}", fields.organizer);

        let resolver = OrganizerResolver::new(self.auth.as_ref(), &self.organizers, &self.config.api);
        let organizer = resolver.resolve(&fields.organizer).await?;

        let record = build_event_record(product, &fields);
        debug!(
            "Event {} on {:?}, price {}, venue '{}' in '{}'",
            record.title,
            record.start_date,
            record.price,
            record.venue(),
            record.city()
        );
        let form = EventForm::from_record(&record, chrono::Local::now().naive_local());
        let response = self
            .publisher
            .publish(&form, image, organizer.token.as_deref())
            .await;
        Ok(response.is_some())
    }

    async fn politeness_delay(&self) {
        let (min, max) = (self.config.http.delay_min_ms, self.config.http.delay_max_ms);
        if max == 0 {
            return;
        }
        let millis = rand::thread_rng().gen_range(min..=max);
        debug!("Waiting for {} ms", millis);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

/// Combines the listing entry and the detail page fields. Missing price and
/// description become the API's placeholder texts; the price uses a dot as
/// decimal separator.
pub fn build_event_record(product: &ProductSummary, fields: &DetailFields) -> EventRecord {
    EventRecord {
        title: product.name.clone(),
        description: fields
            .description
            .clone()
            .unwrap_or_else(|| DESCRIPTION_NOT_FOUND.to_string()),
        start_date: product.start_date.clone(),
        price: fields
            .price
            .as_deref()
            .unwrap_or(PRICE_NOT_FOUND)
            .replace(',', "."),
        location: fields.location.clone(),
        category_id: product.assigned_category_id.clone(),
        source_url: product.link.clone(),
    }
}
