//! Server configuration loaded from environment variables.
//!
//! Configuration is read once at startup and handed to the handlers through
//! [`crate::state::AppState`]; nothing reads the process environment per
//! request.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `SERVER_HOST` - Bind address (default: 127.0.0.1)
//! - `SERVER_PORT` - Listen port (default: 3000)
//! - `RESEND_API_KEY` - Email API bearer credential. Without it every valid
//!   submission is answered with a configuration error.
//! - `RESEND_API_URL` - Email API base URL (default: <https://api.resend.com>)
//! - `CONTACT_FROM` - Sender shown on notification emails
//! - `CONTACT_TO` - Inbox that receives notifications
//! - `CONTACT_FALLBACK_EMAIL` - Address quoted to visitors when something
//!   fails (default: `CONTACT_TO`)
//! - `CONTACT_LOCATION` - Location stamped on stored submissions (default: Singapore)
//! - `CONTACT_DATABASE_URL` - `PostgreSQL` connection string for the
//!   key-value store, falls back to `DATABASE_URL`. Persistence is disabled
//!   when neither is set.
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use advisor_site_core::{DEFAULT_LOCATION, Email};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.resend.com";
pub const DEFAULT_FROM: &str = "Portfolio Contact <onboarding@resend.dev>";
pub const DEFAULT_TO: &str = "hello@advisor.example";

/// Shortest email API key accepted from the environment.
const MIN_API_KEY_LEN: usize = 16;

/// Fragments of the sample values found in `.env.example` files.
const SAMPLE_KEY_FRAGMENTS: &[&str] = &["your", "changeme", "placeholder", "example", "xxxx", "<"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("RESEND_API_KEY is unusable: {0}")]
    UnusableApiKey(String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Key-value store connection URL (contains password)
    pub database_url: Option<SecretString>,
    /// Outbound email configuration
    pub email: EmailConfig,
    /// Address quoted to visitors in failure messages
    pub fallback_email: String,
    /// Location stamped on stored submissions
    pub location: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Email API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct EmailConfig {
    /// Bearer credential for the email API
    pub api_key: Option<SecretString>,
    /// Base URL of the email API (no trailing slash)
    pub api_url: String,
    /// `From` header of notification emails
    pub from: String,
    /// Recipient of notification emails
    pub to: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            from: DEFAULT_FROM.to_string(),
            to: DEFAULT_TO.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            database_url: None,
            email: EmailConfig::default(),
            fallback_email: DEFAULT_TO.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed, an address does not
    /// parse, or the email API key looks truncated or left at a sample value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SERVER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SERVER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SERVER_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SERVER_PORT".to_string(), e.to_string()))?;

        let email = EmailConfig::from_env()?;
        let fallback_email = match get_optional_env("CONTACT_FALLBACK_EMAIL") {
            Some(address) => parse_address("CONTACT_FALLBACK_EMAIL", &address)?,
            None => email.to.clone(),
        };

        Ok(Self {
            host,
            port,
            database_url: get_database_url("CONTACT_DATABASE_URL"),
            email,
            fallback_email,
            location: get_env_or_default("CONTACT_LOCATION", DEFAULT_LOCATION),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Read only the key-value store URL (`CONTACT_DATABASE_URL`, then
    /// `DATABASE_URL`). Used by tooling that never sends email.
    #[must_use]
    pub fn database_url_from_env() -> Option<SecretString> {
        let _ = dotenvy::dotenv();
        get_database_url("CONTACT_DATABASE_URL")
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_url = get_env_or_default("RESEND_API_URL", DEFAULT_API_URL);
        Url::parse(&api_url)
            .map_err(|e| ConfigError::InvalidEnvVar("RESEND_API_URL".to_string(), e.to_string()))?;

        Ok(Self {
            api_key: get_optional_env("RESEND_API_KEY")
                .map(|key| check_api_key(&key).map(|()| SecretString::from(key)))
                .transpose()?,
            api_url: api_url.trim_end_matches('/').to_string(),
            from: get_env_or_default("CONTACT_FROM", DEFAULT_FROM),
            to: parse_address("CONTACT_TO", &get_env_or_default("CONTACT_TO", DEFAULT_TO))?,
        })
    }
}

/// Get an optional environment variable, treating an empty value as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Option<SecretString> {
    get_optional_env(primary_key)
        .or_else(|| get_optional_env("DATABASE_URL"))
        .map(SecretString::from)
}

/// Normalize an address variable through the same rule as submissions.
fn parse_address(key: &str, value: &str) -> Result<String, ConfigError> {
    Email::parse(value)
        .map(Email::into_inner)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject keys that were pasted with whitespace, truncated, or left at a
/// sample value.
fn check_api_key(key: &str) -> Result<(), ConfigError> {
    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::UnusableApiKey("contains whitespace".to_string()));
    }
    if key.len() < MIN_API_KEY_LEN {
        return Err(ConfigError::UnusableApiKey(format!(
            "too short ({} chars, need at least {MIN_API_KEY_LEN})",
            key.len()
        )));
    }

    let lower = key.to_lowercase();
    if let Some(fragment) = SAMPLE_KEY_FRAGMENTS.iter().find(|f| lower.contains(**f)) {
        return Err(ConfigError::UnusableApiKey(format!(
            "looks like a sample value (contains '{fragment}')"
        )));
    }

    Ok(())
}
