#![allow(dead_code)]

use async_trait::async_trait;
use eventim_scraper::app::ports::{AuthApi, EventSource, PublishApi};
use eventim_scraper::config::{CategoryConfig, Config, LedgerBackend};
use eventim_scraper::error::{Result, ScraperError};
use eventim_scraper::organizer::{RegisterOutcome, Registration};
use eventim_scraper::publish::EventForm;
use eventim_scraper::types::{ListingPage, ProductSummary};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const DETAIL_HTML: &str = r#"
<html><head><meta property="og:title" content="Siddharta - Ljubljana"></head>
<body>
  <div class="stage-price">€ 12,50</div>
  <div class="moretext-teaser"><p>Veliki koncert.</p></div>
  <div class="event-listing-item">
    <span class="event-listing-venue">Stožice</span>
    <span class="event-listing-event">LJUBLJANA</span>
  </div>
</body></html>"#;

/// Config rooted in `root` with a single music category.
pub fn test_config(root: &Path, api_base_url: &str) -> Config {
    let mut config = Config::default();
    config.source.categories = vec![CategoryConfig::new("Glasba", "Glasba", "1")];
    config.api.base_url = api_base_url.to_string();
    config.storage.backend = LedgerBackend::Files;
    config.storage.processed_events_path = root.join("processed_events.txt");
    config.storage.organizers_path = root.join("organizer_list.txt");
    config.storage.sqlite_path = root.join("ledger.db");
    config.storage.temp_image_dir = root.join("temp_images");
    config
}

pub fn product(name: &str, image_url: Option<&str>) -> ProductSummary {
    ProductSummary {
        name: name.to_string(),
        start_date: Some("2025-06-14T20:00:00+02:00".to_string()),
        image_url: image_url.map(str::to_string),
        categories: vec![],
        link: format!("https://www.eventim.si/event/{}/", name.to_lowercase().replace(' ', "-")),
        assigned_category_id: String::new(),
    }
}

/// Listing source serving canned pages and recording every call in order.
#[derive(Default)]
pub struct FakeSource {
    pub pages: HashMap<(String, u32), ListingPage>,
    pub fail_listing: bool,
    pub fail_detail_for: Option<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_page(self, category: &str, page: u32, total_pages: Option<u32>, products: Vec<ProductSummary>) -> Self {
        let entries = products
            .iter()
            .map(|p| serde_json::to_value(p).unwrap())
            .collect();
        self.with_raw_page(category, page, total_pages, entries)
    }

    /// Page whose entries are served exactly as given.
    pub fn with_raw_page(mut self, category: &str, page: u32, total_pages: Option<u32>, entries: Vec<Value>) -> Self {
        self.pages.insert(
            (category.to_string(), page),
            ListingPage {
                total_pages,
                product_groups: entries,
            },
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl EventSource for FakeSource {
    async fn fetch_listing_page(&self, category: &CategoryConfig, page: u32) -> Result<ListingPage> {
        self.log(format!("listing:{}:{}", category.query, page));
        if self.fail_listing {
            return Err(ScraperError::Status {
                url: "https://public-api.eventim.com/".into(),
                status: 503,
            });
        }
        Ok(self
            .pages
            .get(&(category.query.clone(), page))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_detail_page(&self, url: &str) -> Result<String> {
        self.log(format!("detail:{}", url));
        if self.fail_detail_for.as_deref() == Some(url) {
            return Err(ScraperError::Status {
                url: url.to_string(),
                status: 404,
            });
        }
        Ok(DETAIL_HTML.to_string())
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        self.log(format!("image:{}", url));
        Ok(b"\x89PNG fake".to_vec())
    }
}

/// Auth API that hands out a token per registration.
#[derive(Default)]
pub struct FakeAuth {
    pub registrations: Mutex<Vec<Registration>>,
    pub logins: Mutex<Vec<String>>,
    pub register_outcome: Option<RegisterOutcome>,
    pub login_token: Option<String>,
}

impl FakeAuth {
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }

    pub fn login_count(&self) -> usize {
        self.logins.lock().unwrap().len()
    }
}

#[async_trait]
impl AuthApi for FakeAuth {
    async fn register(&self, registration: &Registration) -> RegisterOutcome {
        self.registrations.lock().unwrap().push(registration.clone());
        self.register_outcome.clone().unwrap_or_else(|| RegisterOutcome::Registered {
            token: Some(format!("token-{}", registration.email)),
        })
    }

    async fn login(&self, email: &str, _password: &str) -> Option<String> {
        self.logins.lock().unwrap().push(email.to_string());
        self.login_token.clone()
    }
}

/// Publisher that records submissions and answers with a fixed response.
pub struct FakePublisher {
    pub response: Option<Value>,
    pub published: Mutex<Vec<(EventForm, bool, Option<String>)>>,
}

impl FakePublisher {
    pub fn accepting() -> Self {
        Self {
            response: Some(json!({ "id": 1 })),
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            response: None,
            published: Mutex::new(Vec::new()),
        }
    }

    pub fn titles(&self) -> Vec<String> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .map(|(form, _, _)| form.title.clone())
            .collect()
    }
}

#[async_trait]
impl PublishApi for FakePublisher {
    async fn publish(&self, form: &EventForm, image: Option<&Path>, token: Option<&str>) -> Option<Value> {
        self.published.lock().unwrap().push((
            form.clone(),
            image.map(|p| p.exists()).unwrap_or(false),
            token.map(str::to_string),
        ));
        self.response.clone()
    }
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
