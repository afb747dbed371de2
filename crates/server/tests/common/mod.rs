//! Shared test fixtures: a scripted MailChimp fake, an in-memory store,
//! and helpers for driving the router.

#![allow(clippy::unwrap_used)]
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::util::ServiceExt;

use mailmirror_server::config::{Config, MailchimpConfig};
use mailmirror_server::db::{ListStore, MemberStore, MemoryStore};
use mailmirror_server::mailchimp::{MailchimpApi, MailchimpError};
use mailmirror_server::routes;
use mailmirror_server::state::AppState;

/// One recorded remote call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// Scripted MailChimp fake.
///
/// Successful mutations return `{"id": "mc-<n>"}` with a fresh counter;
/// `fail_with` switches every subsequent call to an API error. Every call
/// is recorded so tests can assert on ordering and zero-side-effect
/// properties.
#[derive(Default)]
pub struct MockMailchimp {
    calls: Mutex<Vec<RecordedCall>>,
    fail_message: Mutex<Option<String>>,
    next_id: Mutex<u64>,
    put_response_id: Mutex<Option<String>>,
}

impl MockMailchimp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with an API error carrying `message`.
    pub fn fail_with(&self, message: &str) {
        *self.fail_message.lock().unwrap() = Some(message.to_string());
    }

    /// Let calls succeed again.
    pub fn succeed(&self) {
        *self.fail_message.lock().unwrap() = None;
    }

    /// Force PUT responses to report this remote id.
    pub fn set_put_response_id(&self, id: &str) {
        *self.put_response_id.lock().unwrap() = Some(id.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn check_failure(&self) -> Result<(), MailchimpError> {
        if let Some(message) = self.fail_message.lock().unwrap().clone() {
            return Err(MailchimpError::Api {
                status: 400,
                message,
            });
        }
        Ok(())
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&Value>) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
    }

    fn fresh_id(&self) -> String {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        format!("mc-{next}")
    }
}

#[async_trait]
impl MailchimpApi for MockMailchimp {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, MailchimpError> {
        self.check_failure()?;
        self.record("POST", path, Some(body));
        Ok(json!({ "id": self.fresh_id() }))
    }

    async fn patch(&self, path: &str, body: &Value) -> Result<Value, MailchimpError> {
        self.check_failure()?;
        self.record("PATCH", path, Some(body));
        Ok(json!({ "id": path.rsplit('/').next().unwrap_or_default() }))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value, MailchimpError> {
        self.check_failure()?;
        self.record("PUT", path, Some(body));
        let id = self
            .put_response_id
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| path.rsplit('/').next().unwrap_or_default().to_string());
        Ok(json!({ "id": id }))
    }

    async fn delete(&self, path: &str) -> Result<(), MailchimpError> {
        self.check_failure()?;
        self.record("DELETE", path, None);
        Ok(())
    }
}

/// Router plus handles on the injected fakes.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub mailchimp: Arc<MockMailchimp>,
}

pub fn test_config() -> Config {
    Config {
        database_url: SecretString::from("postgres://unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        mailchimp: MailchimpConfig {
            api_key: SecretString::from("test-key-us1"),
            base_url: None,
        },
        sentry_dsn: None,
    }
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let mailchimp = Arc::new(MockMailchimp::new());

    let state = AppState::new(
        test_config(),
        Arc::clone(&store) as Arc<dyn ListStore>,
        Arc::clone(&store) as Arc<dyn MemberStore>,
        Arc::clone(&mailchimp) as Arc<dyn MailchimpApi>,
    );

    TestApp {
        app: routes::routes().with_state(state),
        store,
        mailchimp,
    }
}

/// Drive one request through the router, returning status and JSON body.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

/// A complete, valid list create payload.
pub fn list_payload() -> Value {
    json!({
        "name": "New list",
        "permission_reminder": "You signed up for updates on Greeks economy.",
        "email_type_option": false,
        "contact": {
            "company": "Doe Ltd.",
            "address1": "DoeStreet 1",
            "address2": "",
            "city": "Doesy",
            "state": "Doedoe",
            "zip": "1672-12",
            "country": "US",
            "phone": "55533344412"
        },
        "campaign_defaults": {
            "from_name": "John Doe",
            "from_email": "john@doe.com",
            "subject": "My new campaign!",
            "language": "US"
        },
        "visibility": "prv",
        "use_archive_bar": false,
        "notify_on_subscribe": "notify@loyaltycorp.com.au",
        "notify_on_unsubscribe": "notify@loyaltycorp.com.au",
        "double_optin": false,
        "marketing_permissions": false
    })
}

/// A complete, valid member create payload.
pub fn member_payload(email: &str) -> Value {
    json!({
        "email_address": email,
        "status": "subscribed",
        "email_type": "html",
        "language": "en",
        "vip": false,
        "tags": ["newsletter"]
    })
}

/// Create a list through the API and return its local id.
pub async fn create_list(app: &TestApp) -> String {
    let (status, body) = request(&app.app, "POST", "/mailchimp/lists", Some(list_payload())).await;
    assert_eq!(status, StatusCode::OK, "list create failed: {body}");
    body["list_id"].as_str().unwrap().to_string()
}

/// Create a member through the API and return its local id.
pub async fn create_member(app: &TestApp, list_id: &str, email: &str) -> String {
    let (status, body) = request(
        &app.app,
        "POST",
        &format!("/mailchimp/lists/{list_id}/members"),
        Some(member_payload(email)),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "member create failed: {body}");
    body["member_id"].as_str().unwrap().to_string()
}
