//! MailChimp Marketing API client.
//!
//! The sync services talk to the remote system exclusively through the
//! [`MailchimpApi`] trait so tests can inject a scripted fake; the real
//! [`MailchimpClient`] speaks HTTP with reqwest.

mod client;

pub use client::{MailchimpClient, MailchimpClientError};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when interacting with the MailChimp API.
///
/// No distinction is made between transient and permanent failures; the
/// coordinator surfaces every kind identically and never retries.
#[derive(Debug, Error)]
pub enum MailchimpError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Remote mutation surface consumed by the sync services.
///
/// Paths are relative to the API root (`lists`, `lists/{id}/members/{id}`).
/// Reads never reach the remote system, so no `get` is exposed.
#[async_trait]
pub trait MailchimpApi: Send + Sync {
    /// Create a resource.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, MailchimpError>;

    /// Partially update a resource.
    async fn patch(&self, path: &str, body: &Value) -> Result<Value, MailchimpError>;

    /// Replace a resource.
    async fn put(&self, path: &str, body: &Value) -> Result<Value, MailchimpError>;

    /// Delete a resource.
    async fn delete(&self, path: &str) -> Result<(), MailchimpError>;
}

/// Extract the remote identifier from a mutation response.
///
/// # Errors
///
/// Returns `MailchimpError::Parse` when the response carries no string `id`.
pub fn response_id(response: &Value) -> Result<String, MailchimpError> {
    response
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| MailchimpError::Parse("response has no id".to_string()))
}
