use crate::config::HttpConfig;
use crate::constants::BROWSER_HEADERS;
use crate::error::{Result, ScraperError};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};

/// Client for the ticketing site: browser-like default headers plus the
/// configured timeout on every request.
pub fn browser_client(http: &HttpConfig) -> Result<Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ScraperError::Config(format!("Invalid header name {name}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ScraperError::Config(format!("Invalid header value for {name}: {e}")))?;
        headers.insert(name, value);
    }
    let client = Client::builder()
        .default_headers(headers)
        .timeout(http.timeout())
        .build()?;
    Ok(client)
}

/// Plain client for the local API.
pub fn api_client(http: &HttpConfig) -> Result<Client> {
    let client = Client::builder().timeout(http.timeout()).build()?;
    Ok(client)
}

/// Turns non-2xx responses into `ScraperError::Status`.
pub fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ScraperError::Status {
            url: resp.url().to_string(),
            status: status.as_u16(),
        })
    }
}
