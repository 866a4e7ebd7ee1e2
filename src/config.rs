use crate::constants;
use crate::error::{Result, ScraperError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Immutable run configuration handed to every client and the pipeline.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub listing_url: String,
    pub web_id: String,
    pub language: String,
    pub retail_partner: String,
    pub categories: Vec<CategoryConfig>,
}

/// One listing category and the id it maps to in the local API.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CategoryConfig {
    /// Display name used in logs
    pub name: String,
    /// Value of the `categories` query parameter
    pub query: String,
    /// `tip_dogodka` sent to the local API
    pub local_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub events_path: String,
    /// Token used when no organizer credential could be obtained
    pub fallback_token: Option<String>,
    pub email_domain: String,
    pub default_password: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    #[default]
    Files,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: LedgerBackend,
    pub processed_events_path: PathBuf,
    pub organizers_path: PathBuf,
    pub sqlite_path: PathBuf,
    pub temp_image_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: constants::EVENTIM_LISTING_URL.to_string(),
            web_id: constants::EVENTIM_WEB_ID.to_string(),
            language: constants::EVENTIM_LANGUAGE.to_string(),
            retail_partner: constants::EVENTIM_RETAIL_PARTNER.to_string(),
            categories: vec![
                CategoryConfig::new("Glasba", "Glasba", "1"),
                CategoryConfig::new("Kultura", "Kultura", "2"),
                CategoryConfig::new("Sport", "Šport", "3"),
            ],
        }
    }
}

impl CategoryConfig {
    pub fn new(name: &str, query: &str, local_id: &str) -> Self {
        Self {
            name: name.to_string(),
            query: query.to_string(),
            local_id: local_id.to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: constants::API_BASE_URL.to_string(),
            events_path: constants::EVENTS_PATH.to_string(),
            fallback_token: None,
            email_domain: constants::ORGANIZER_EMAIL_DOMAIN.to_string(),
            default_password: constants::ORGANIZER_PASSWORD.to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Files,
            processed_events_path: PathBuf::from(constants::PROCESSED_EVENTS_FILE),
            organizers_path: PathBuf::from(constants::ORGANIZERS_FILE),
            sqlite_path: PathBuf::from(constants::LEDGER_DB_FILE),
            temp_image_dir: PathBuf::from(constants::TEMP_IMAGE_DIR),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: constants::HTTP_TIMEOUT_SECONDS,
            delay_min_ms: 0,
            delay_max_ms: 0,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl ApiConfig {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Config {
    /// Loads the TOML config at `path`, falling back to defaults when the file
    /// is absent, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                ScraperError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            Self::from_toml(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("EVENTIM_API_BASE_URL") {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
        if let Ok(token) = std::env::var("EVENTIM_FALLBACK_TOKEN") {
            if !token.trim().is_empty() {
                self.api.fallback_token = Some(token);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.source.categories.is_empty() {
            return Err(ScraperError::Config("at least one category is required".into()));
        }
        if self.http.delay_min_ms > self.http.delay_max_ms {
            return Err(ScraperError::Config(format!(
                "delay_min_ms ({}) exceeds delay_max_ms ({})",
                self.http.delay_min_ms, self.http.delay_max_ms
            )));
        }
        Ok(())
    }
}
