//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::db::KeyValueStore;
use crate::services::{EmailClient, EmailError, SubmissionObserver, TracingObserver};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the email client, the optional key-value store and the
/// diagnostic observer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    email: EmailClient,
    store: Option<Arc<dyn KeyValueStore>>,
    observer: Arc<dyn SubmissionObserver>,
}

impl AppState {
    /// Create a new application state with a [`TracingObserver`].
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `store` - Key-value store; `None` disables persistence
    ///
    /// # Errors
    ///
    /// Returns an error if the email HTTP client cannot be built.
    pub fn new(
        config: ServerConfig,
        store: Option<Arc<dyn KeyValueStore>>,
    ) -> Result<Self, EmailError> {
        Self::with_observer(config, store, Arc::new(TracingObserver))
    }

    /// Create a new application state with a custom observer.
    ///
    /// # Errors
    ///
    /// Returns an error if the email HTTP client cannot be built.
    pub fn with_observer(
        config: ServerConfig,
        store: Option<Arc<dyn KeyValueStore>>,
        observer: Arc<dyn SubmissionObserver>,
    ) -> Result<Self, EmailError> {
        let email = EmailClient::new(&config.email)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                email,
                store,
                observer,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the email client.
    #[must_use]
    pub fn email(&self) -> &EmailClient {
        &self.inner.email
    }

    /// Get the key-value store, if persistence is enabled.
    #[must_use]
    pub fn store(&self) -> Option<&dyn KeyValueStore> {
        self.inner.store.as_deref()
    }

    /// Get the submission observer.
    #[must_use]
    pub fn observer(&self) -> &dyn SubmissionObserver {
        self.inner.observer.as_ref()
    }
}
