//! HTTP implementation of the MailChimp API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::{ConfigError, MailchimpConfig};

use super::{MailchimpApi, MailchimpError};

/// Request timeout for remote calls. A timeout surfaces as
/// `MailchimpError::Http` and is handled like any other remote failure.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// MailChimp uses HTTP Basic auth where the username is ignored.
const BASIC_AUTH_USER: &str = "anystring";

/// MailChimp Marketing API client.
#[derive(Clone)]
pub struct MailchimpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl MailchimpClient {
    /// Create a new MailChimp API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be resolved from the
    /// configuration or the HTTP client fails to build.
    pub fn new(config: &MailchimpConfig) -> Result<Self, MailchimpClientError> {
        let base_url = config.resolve_base_url()?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, MailchimpError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self
            .client
            .request(method, &url)
            .basic_auth(BASIC_AUTH_USER, Some(self.api_key.expose_secret()));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = error_message(&response.text().await.unwrap_or_default());
            return Err(MailchimpError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        response
            .json()
            .await
            .map_err(|e| MailchimpError::Parse(e.to_string()))
    }
}

#[async_trait]
impl MailchimpApi for MailchimpClient {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, MailchimpError> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, MailchimpError> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, MailchimpError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), MailchimpError> {
        self.request(Method::DELETE, path, None).await.map(|_| ())
    }
}

/// Errors building a [`MailchimpClient`].
#[derive(Debug, thiserror::Error)]
pub enum MailchimpClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Pull the human-readable message out of a MailChimp error body.
///
/// The API reports problems as RFC 7807-ish JSON with `detail` and `title`
/// fields; fall back to the raw body when it is not JSON.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .or_else(|| value.get("title"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.to_string())
}
