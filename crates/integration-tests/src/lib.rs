//! Integration test harness for the contact flow.
//!
//! [`TestServer`] binds the real router to an ephemeral port, backed by a
//! [`MemoryStore`] and a mocked email API, so tests drive it over HTTP the
//! way the site does.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p advisor-site-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;
use std::sync::Arc;

use advisor_site_cli::{ContactFormFields, FormSubmitter};
use advisor_site_server::config::{EmailConfig, ServerConfig};
use advisor_site_server::db::{KeyValueStore, MemoryStore};
use advisor_site_server::services::RecordingObserver;
use advisor_site_server::state::AppState;
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Address quoted in server and form failure notices during tests.
pub const FALLBACK_EMAIL: &str = "advisor@example.com";

/// Builder for [`TestServer`].
pub struct TestServerBuilder {
    api_key: Option<String>,
    store: Option<MemoryStore>,
    email_status: u16,
    expected_emails: Option<u64>,
}

impl Default for TestServerBuilder {
    fn default() -> Self {
        Self {
            api_key: Some("re_integration_key".to_string()),
            store: Some(MemoryStore::new()),
            email_status: 200,
            expected_emails: None,
        }
    }
}

impl TestServerBuilder {
    /// Run without an email credential.
    #[must_use]
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    /// Run without a key-value store.
    #[must_use]
    pub fn without_store(mut self) -> Self {
        self.store = None;
        self
    }

    /// Use a store whose writes fail.
    #[must_use]
    pub fn failing_store(mut self) -> Self {
        self.store = Some(MemoryStore::failing());
        self
    }

    /// Status the mocked email API answers with.
    #[must_use]
    pub const fn email_status(mut self, status: u16) -> Self {
        self.email_status = status;
        self
    }

    /// Exact number of email API calls the test expects; verified when the
    /// server is dropped.
    #[must_use]
    pub const fn expect_emails(mut self, count: u64) -> Self {
        self.expected_emails = Some(count);
        self
    }

    /// Start the email mock and the contact server.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound or the state cannot be built.
    pub async fn start(self) -> TestServer {
        let email_api = MockServer::start().await;
        let mock = Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(
                ResponseTemplate::new(self.email_status).set_body_json(json!({"id": "em_test"})),
            );
        match self.expected_emails {
            Some(count) => mock.expect(count).mount(&email_api).await,
            None => mock.mount(&email_api).await,
        }

        let config = ServerConfig {
            email: EmailConfig {
                api_key: self.api_key.map(SecretString::from),
                api_url: email_api.uri(),
                ..EmailConfig::default()
            },
            fallback_email: FALLBACK_EMAIL.to_string(),
            ..ServerConfig::default()
        };

        let observer = RecordingObserver::new();
        let store = self.store.clone();
        let state = AppState::with_observer(
            config,
            store.map(|s| Arc::new(s) as Arc<dyn KeyValueStore>),
            Arc::new(observer.clone()),
        )
        .expect("app state");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = advisor_site_server::app(state);
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        TestServer {
            addr,
            client: reqwest::Client::new(),
            store: self.store.unwrap_or_default(),
            observer,
            email_api,
            handle,
        }
    }
}

/// A running contact server.
pub struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    /// The backing store (an unused empty store when started without one).
    pub store: MemoryStore,
    /// Submission events in order.
    pub observer: RecordingObserver,
    /// The mocked email API.
    pub email_api: MockServer,
    handle: JoinHandle<()>,
}

impl TestServer {
    #[must_use]
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// Start with a credential, an empty store and a succeeding email API.
    pub async fn start() -> Self {
        Self::builder().start().await
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// POST a JSON body and return the status with the decoded body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request");
        let status = response.status();
        (status, response.json().await.expect("JSON body"))
    }

    /// A form submitter pointed at `/api/contact`, as the page uses.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn submitter(&self, fields: ContactFormFields) -> FormSubmitter {
        FormSubmitter::new(self.url("/api/contact"), FALLBACK_EMAIL)
            .expect("submitter")
            .with_fields(fields)
    }

    /// Requests the email API has received.
    pub async fn email_requests(&self) -> Vec<wiremock::Request> {
        self.email_api.received_requests().await.unwrap_or_default()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// The canonical valid submission.
#[must_use]
pub fn jane() -> Value {
    json!({
        "name": "Jane Tan",
        "email": "jane@example.com",
        "phone": "+65 9123 4567",
        "message": "Interested in retirement planning",
    })
}

/// [`jane`] as form fields.
#[must_use]
pub fn jane_fields() -> ContactFormFields {
    ContactFormFields::new(
        "Jane Tan",
        "jane@example.com",
        "+65 9123 4567",
        "Interested in retirement planning",
    )
}
