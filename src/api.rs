use crate::config::Config;
use crate::error::{Error, Result};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub mod beverages;
pub mod history;
pub mod machines;
pub mod models;
pub mod status;

/// Client for the JSON record store holding machines, beverages, brew
/// statuses and history.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        ApiClient {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        ApiClient::new(&config.api_url).with_timeout(config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.http_client.get(self.url(path)).timeout(self.timeout)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.http_client.post(self.url(path)).timeout(self.timeout)
    }

    pub(crate) fn put(&self, path: &str) -> RequestBuilder {
        self.http_client.put(self.url(path)).timeout(self.timeout)
    }

    pub(crate) fn delete(&self, path: &str) -> RequestBuilder {
        self.http_client.delete(self.url(path)).timeout(self.timeout)
    }
}

/// Decodes a single record, mapping a 404 to [`Error::NotFound`].
pub(crate) async fn found<T: DeserializeOwned>(res: Response, what: String) -> Result<T> {
    if res.status() == StatusCode::NOT_FOUND {
        return Err(Error::NotFound(what));
    }
    Ok(res.error_for_status()?.json::<T>().await?)
}

/// Deletes are accepted when the record is already gone.
pub(crate) fn deleted(res: Response, what: String) -> Result<()> {
    if res.status() == StatusCode::NOT_FOUND {
        log::debug!("{} was already deleted", what);
        return Ok(());
    }
    res.error_for_status()?;
    Ok(())
}
