use crate::app::ports::{AuthApi, PublishApi};
use crate::config::{ApiConfig, Config};
use crate::constants::{EMAIL_EXISTS_MARKER, LOGIN_PATH, REGISTER_PATH};
use crate::error::Result;
use crate::infra::http_client::api_client;
use crate::organizer::{RegisterOutcome, Registration};
use crate::publish::{image_content_type, EventForm, IMAGE_FIELD};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// Client for the local events API (`/users/*` and the events endpoint).
pub struct BackendClient {
    client: Client,
    api: ApiConfig,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: api_client(&config.http)?,
            api: config.api.clone(),
        })
    }

    async fn multipart_form(&self, form: &EventForm, image: Option<&Path>) -> Form {
        let mut multipart = form
            .fields()
            .into_iter()
            .fold(Form::new(), |acc, (name, value)| acc.text(name, value));

        let Some(path) = image.filter(|p| p.exists()) else {
            return multipart;
        };
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| "image.png".to_string());
                match Part::bytes(bytes).file_name(file_name).mime_str(image_content_type(path)) {
                    Ok(part) => {
                        info!("Including image file: {}", path.display());
                        multipart = multipart.part(IMAGE_FIELD, part);
                    }
                    Err(e) => warn!("Skipping image {}: {}", path.display(), e),
                }
            }
            Err(e) => warn!("Could not read image {}: {}", path.display(), e),
        }
        multipart
    }
}

/// Extracts the `token` field of a JSON body.
fn token_from(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .get("token")?
        .as_str()
        .map(str::to_string)
}

#[async_trait]
impl AuthApi for BackendClient {
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    async fn register(&self, registration: &Registration) -> RegisterOutcome {
        let url = self.api.url(REGISTER_PATH);
        let resp = match self
            .client
            .post(&url)
            .form(&registration.form_fields())
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("API registration error: {}", e);
                return RegisterOutcome::Failed;
            }
        };

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            if body.contains(EMAIL_EXISTS_MARKER) {
                warn!("User {} already exists", registration.email);
                return RegisterOutcome::ExistingUser;
            }
            error!("API registration failed with status {}: {}", status.as_u16(), body);
            return RegisterOutcome::Failed;
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                debug!("API registration response: {}", value);
                RegisterOutcome::Registered {
                    token: value.get("token").and_then(Value::as_str).map(str::to_string),
                }
            }
            Err(e) => {
                error!("Registration response is not JSON: {}", e);
                RegisterOutcome::Failed
            }
        }
    }

    #[instrument(skip(self, password))]
    async fn login(&self, email: &str, password: &str) -> Option<String> {
        let url = self.api.url(LOGIN_PATH);
        let resp = match self
            .client
            .post(&url)
            .form(&[("email", email), ("password", password)])
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("API login error: {}", e);
                return None;
            }
        };
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            error!("API login failed with status {}: {}", status.as_u16(), body);
            return None;
        }
        let token = token_from(&body);
        if token.is_some() {
            info!("Login successful, got token");
        } else {
            warn!("Login response carried no token");
        }
        token
    }
}

#[async_trait]
impl PublishApi for BackendClient {
    #[instrument(skip(self, form, image, token), fields(title = %form.title))]
    async fn publish(
        &self,
        form: &EventForm,
        image: Option<&Path>,
        token: Option<&str>,
    ) -> Option<Value> {
        let url = self.api.url(&self.api.events_path);
        info!("Sending event data to API: {}", url);
        debug!("API request data: {:?}", form);

        let multipart = self.multipart_form(form, image).await;
        let mut request = self.client.post(&url).multipart(multipart);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let resp = match request.send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("API request error: {}", e);
                return None;
            }
        };
        let status = resp.status();
        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("Failed to read API response: {}", e);
                return None;
            }
        };
        if !status.is_success() {
            error!("API request failed with status {}: {}", status.as_u16(), body);
            return None;
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                info!("API response: {}", value);
                Some(value)
            }
            Err(_) => {
                info!("API response (not JSON): {}", body);
                Some(json!({ "status": status.as_u16(), "text": body }))
            }
        }
    }
}
