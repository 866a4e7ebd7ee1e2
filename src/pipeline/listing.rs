use crate::app::ports::EventSource;
use crate::config::CategoryConfig;
use crate::error::Result;
use crate::types::{ProductSummary, RejectedEntry};
use tracing::{info, info_span, warn, Instrument};

/// Everything read from the category listings of one run.
#[derive(Debug, Default)]
pub struct CollectedListings {
    pub products: Vec<ProductSummary>,
    /// Entries that could not be read; they count as failed events
    pub rejected: Vec<RejectedEntry>,
}

/// Pages through every category and returns all listed events, each tagged
/// with its category's local id. The page count reported by the first page
/// bounds the walk. A failed page fetch aborts the whole collection; a
/// malformed entry only rejects that entry.
pub async fn collect_products(
    source: &dyn EventSource,
    categories: &[CategoryConfig],
) -> Result<CollectedListings> {
    let mut collected = CollectedListings::default();
    for category in categories {
        let span = info_span!("category", name = %category.name, id = %category.local_id);
        collect_category(source, category, &mut collected)
            .instrument(span)
            .await?;
    }
    info!(
        "Collected {} events across {} categories ({} unreadable entries)",
        collected.products.len(),
        categories.len(),
        collected.rejected.len()
    );
    Ok(collected)
}

async fn collect_category(
    source: &dyn EventSource,
    category: &CategoryConfig,
    collected: &mut CollectedListings,
) -> Result<()> {
    let mut current_page = 1;
    let mut total_pages = 1;

    while current_page <= total_pages {
        let listing = source.fetch_listing_page(category, current_page).await?;
        if current_page == 1 {
            if let Some(total) = listing.total_pages {
                total_pages = total;
                info!("Found {} pages of events for category {}", total_pages, category.name);
            }
        }
        for entry in listing.into_entries() {
            match entry {
                Ok(mut product) => {
                    product.assigned_category_id = category.local_id.clone();
                    collected.products.push(product);
                }
                Err(rejected) => {
                    warn!(
                        "Skipping unreadable listing entry '{}' on page {}: {}",
                        rejected.label(),
                        current_page,
                        rejected.reason
                    );
                    collected.rejected.push(rejected);
                }
            }
        }
        current_page += 1;
    }
    Ok(())
}
