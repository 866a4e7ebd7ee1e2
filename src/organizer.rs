//! Maps organizer names to API credentials, registering accounts on first
//! sighting.

use crate::app::ports::AuthApi;
use crate::config::ApiConfig;
use crate::constants::{ORGANIZER_LAST_NAME_FALLBACK, ORGANIZER_USER_TYPE};
use crate::error::Result;
use crate::ledger::OrganizerLedger;
use crate::types::OrganizerCredential;
use chrono::NaiveDate;
use tracing::{info, instrument, warn};

/// Form body of `POST /users/register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub birth_date: String,
    pub user_type: String,
}

impl Registration {
    /// Builds the placeholder account for `name`: the email is the name
    /// lower-cased with spaces removed, the birth date is `today`.
    pub fn for_organizer(name: &str, api: &ApiConfig, today: NaiveDate) -> Self {
        let (first_name, last_name) = match name.split_once(' ') {
            Some((first, rest)) => (first.to_string(), rest.to_string()),
            None => (name.to_string(), ORGANIZER_LAST_NAME_FALLBACK.to_string()),
        };
        Self {
            first_name,
            last_name,
            email: organizer_email(name, &api.email_domain),
            password: api.default_password.clone(),
            birth_date: today.format("%Y-%m-%d").to_string(),
            user_type: ORGANIZER_USER_TYPE.to_string(),
        }
    }

    pub fn form_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("ime", self.first_name.as_str()),
            ("priimek", self.last_name.as_str()),
            ("email", self.email.as_str()),
            ("geslo", self.password.as_str()),
            ("datumRojstva", self.birth_date.as_str()),
            ("tip_uporabnika", self.user_type.as_str()),
        ]
    }
}

pub fn organizer_email(name: &str, domain: &str) -> String {
    format!("{}@{}", name.to_lowercase().replace(' ', ""), domain)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered { token: Option<String> },
    /// The API reported the email as taken.
    ExistingUser,
    Failed,
}

/// Where the token handed to the publisher came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Stored,
    LoggedIn,
    Registered,
    Fallback,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOrganizer {
    pub name: String,
    pub token: Option<String>,
    pub source: TokenSource,
}

pub struct OrganizerResolver<'a> {
    auth: &'a dyn AuthApi,
    ledger: &'a OrganizerLedger,
    api: &'a ApiConfig,
}

impl<'a> OrganizerResolver<'a> {
    pub fn new(auth: &'a dyn AuthApi, ledger: &'a OrganizerLedger, api: &'a ApiConfig) -> Self {
        Self { auth, ledger, api }
    }

    /// Returns a token for `name`. Only ledger I/O errors are returned as
    /// `Err`; API failures fall through to the fallback token.
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> Result<ResolvedOrganizer> {
        let (token, source) = match self.ledger.lookup(name)? {
            Some(OrganizerCredential { token: Some(token), .. }) => {
                info!("Using saved token for organizer '{}'", name);
                (Some(token), TokenSource::Stored)
            }
            Some(credential) => {
                info!("No saved token for organizer '{}', logging in", name);
                let token = self.auth.login(&credential.email, &credential.password).await;
                (token, TokenSource::LoggedIn)
            }
            None => {
                let token = self.register(name).await?;
                (token, TokenSource::Registered)
            }
        };

        if token.is_some() {
            return Ok(ResolvedOrganizer {
                name: name.to_string(),
                token,
                source,
            });
        }

        match &self.api.fallback_token {
            Some(fallback) => {
                warn!("Failed to get token for organizer '{}', using fallback token", name);
                Ok(ResolvedOrganizer {
                    name: name.to_string(),
                    token: Some(fallback.clone()),
                    source: TokenSource::Fallback,
                })
            }
            None => {
                warn!("Failed to get token for organizer '{}' and no fallback token is configured", name);
                Ok(ResolvedOrganizer {
                    name: name.to_string(),
                    token: None,
                    source: TokenSource::Missing,
                })
            }
        }
    }

    async fn register(&self, name: &str) -> Result<Option<String>> {
        info!("Registering new organizer: {}", name);
        let registration = Registration::for_organizer(name, self.api, chrono::Local::now().date_naive());
        match self.auth.register(&registration).await {
            RegisterOutcome::Registered { token: Some(token) } => {
                self.ledger.record(&OrganizerCredential {
                    name: name.to_string(),
                    email: registration.email,
                    password: registration.password,
                    token: Some(token.clone()),
                })?;
                Ok(Some(token))
            }
            RegisterOutcome::Registered { token: None } => {
                warn!("Registration of '{}' returned no token", name);
                Ok(None)
            }
            // TODO: log in with the derived email and default password instead of giving up
            RegisterOutcome::ExistingUser => {
                warn!("Organizer '{}' already has an account", name);
                Ok(None)
            }
            RegisterOutcome::Failed => Ok(None),
        }
    }
}
