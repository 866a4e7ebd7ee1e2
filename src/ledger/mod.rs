//! Append-only ledgers used to skip work already done in earlier runs.

pub mod files;
pub mod sqlite;

pub use files::{JsonLinesLedgerFile, TitleLedgerFile};
pub use sqlite::SqliteLedger;

use crate::config::{LedgerBackend, StorageConfig};
use crate::error::Result;
use crate::types::OrganizerCredential;
use tracing::{info, warn};

/// Persistent string map. Implementations are append-only: `put` on an
/// existing key never replaces the stored value.
pub trait LedgerStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
    /// Every stored value in insertion order.
    fn values(&self) -> Result<Vec<String>>;
}

/// Titles of events that were published successfully.
pub struct ProcessedEvents {
    store: Box<dyn LedgerStore>,
}

impl ProcessedEvents {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub fn is_processed(&self, title: &str) -> Result<bool> {
        self.store.contains(title)
    }

    pub fn mark_processed(&self, title: &str) -> Result<()> {
        self.store.put(title, title)
    }
}

/// Organizer accounts registered against the local API.
pub struct OrganizerLedger {
    store: Box<dyn LedgerStore>,
}

impl OrganizerLedger {
    pub fn new(store: Box<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// First credential stored under `name`, if any.
    pub fn lookup(&self, name: &str) -> Result<Option<OrganizerCredential>> {
        let Some(raw) = self.store.get(name)? else {
            return Ok(None);
        };
        match serde_json::from_str::<OrganizerCredential>(&raw) {
            Ok(cred) => Ok(Some(cred)),
            Err(e) => {
                warn!("Ignoring unreadable organizer record for '{}': {}", name, e);
                Ok(None)
            }
        }
    }

    /// All readable credentials, in registration order.
    pub fn all(&self) -> Result<Vec<OrganizerCredential>> {
        Ok(self
            .store
            .values()?
            .iter()
            .filter_map(|raw| serde_json::from_str(raw).ok())
            .collect())
    }

    pub fn record(&self, credential: &OrganizerCredential) -> Result<()> {
        let line = serde_json::to_string(credential)?;
        self.store.put(&credential.name, &line)
    }
}

/// Opens both ledgers on the configured backend.
pub fn open_ledgers(storage: &StorageConfig) -> Result<(ProcessedEvents, OrganizerLedger)> {
    match storage.backend {
        LedgerBackend::Files => {
            info!(
                "Using file ledgers {} and {}",
                storage.processed_events_path.display(),
                storage.organizers_path.display()
            );
            Ok((
                ProcessedEvents::new(Box::new(TitleLedgerFile::new(&storage.processed_events_path))),
                OrganizerLedger::new(Box::new(JsonLinesLedgerFile::new(&storage.organizers_path, "name"))),
            ))
        }
        LedgerBackend::Sqlite => {
            info!("Using SQLite ledger {}", storage.sqlite_path.display());
            Ok((
                ProcessedEvents::new(Box::new(SqliteLedger::open(&storage.sqlite_path, "processed_events")?)),
                OrganizerLedger::new(Box::new(SqliteLedger::open(&storage.sqlite_path, "organizers")?)),
            ))
        }
    }
}
