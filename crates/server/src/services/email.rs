//! Notification email delivery through the Resend HTTP API.
//!
//! One POST per submission; no retries. The HTML body is rendered from an
//! Askama template so every visitor-supplied field is HTML-escaped.

use std::time::Duration;

use advisor_site_core::ContactSubmission;
use askama::Template;
use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EmailConfig;

/// Request timeout for the email API.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Singapore observes UTC+08:00 all year.
const SINGAPORE_UTC_OFFSET_HOURS: i64 = 8;

/// HTML template for the contact notification.
#[derive(Template)]
#[template(path = "email/contact_notification.html")]
struct ContactNotificationHtml<'a> {
    id: &'a str,
    name: &'a str,
    email: &'a str,
    phone: &'a str,
    dial: String,
    message_lines: Vec<&'a str>,
    submitted_at: String,
    location: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// No API key was configured.
    #[error("Email API key is not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl EmailError {
    /// Short description safe to return to the visitor.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::NotConfigured => "email service not configured".to_string(),
            Self::Http(_) => "email service unreachable".to_string(),
            Self::Api { status, .. } => format!("email service returned status {status}"),
            Self::Template(_) => "notification could not be rendered".to_string(),
        }
    }
}

/// Body of `POST /emails`.
#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

/// Acknowledgement returned by the email API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentEmail {
    /// Provider message ID, when the API returned one.
    #[serde(default)]
    pub id: Option<String>,
}

/// Client for the email API.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    from: String,
    to: String,
}

impl EmailClient {
    /// Create a new email client from configuration.
    ///
    /// A missing API key is not an error here; it is reported per request via
    /// [`Self::is_configured`] so the handler can fail before any network I/O.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }

    /// Whether an API key is available.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Send the notification for a submission to the configured inbox.
    ///
    /// The visitor's address is set as `reply_to`.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::NotConfigured`] without touching the network when
    /// no API key is set, or the transport/API error otherwise.
    pub async fn send_contact_notification(
        &self,
        submission: &ContactSubmission,
        location: &str,
    ) -> Result<SentEmail, EmailError> {
        let api_key = self.api_key.as_ref().ok_or(EmailError::NotConfigured)?;

        let html = render_notification(submission, location)?;
        let subject = notification_subject(&submission.details.name);
        let body = SendEmailRequest {
            from: &self.from,
            to: [&self.to],
            subject: &subject,
            html: &html,
            reply_to: Some(submission.details.email.as_str()),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        // The email is already accepted; an unreadable acknowledgement only
        // loses the provider ID.
        let sent = response.json::<SentEmail>().await.unwrap_or_default();

        tracing::info!(
            submission_id = %submission.id,
            message_id = sent.id.as_deref().unwrap_or("-"),
            "Contact notification sent"
        );
        Ok(sent)
    }
}

/// Render the HTML notification for a submission.
///
/// # Errors
///
/// Returns error if the template fails to render.
pub fn render_notification(
    submission: &ContactSubmission,
    location: &str,
) -> Result<String, EmailError> {
    let details = &submission.details;
    let html = ContactNotificationHtml {
        id: submission.id.as_str(),
        name: &details.name,
        email: details.email.as_str(),
        phone: details.phone.as_str(),
        dial: details.phone.dial_string(),
        message_lines: details.message.lines().collect(),
        submitted_at: format_submitted_at(submission.timestamp),
        location,
    }
    .render()?;
    Ok(html)
}

/// Subject line, with any line breaks in the name collapsed.
fn notification_subject(name: &str) -> String {
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("New Consultation Request from {name}")
}

/// Format a timestamp as Singapore local time, e.g.
/// `Monday, 19 October 2026 at 4:30 pm SGT`.
#[must_use]
pub fn format_submitted_at(timestamp: DateTime<Utc>) -> String {
    let local = timestamp.naive_utc() + TimeDelta::hours(SINGAPORE_UTC_OFFSET_HOURS);
    local.format("%A, %-d %B %Y at %-I:%M %P SGT").to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use advisor_site_core::{ContactForm, DEFAULT_LOCATION};
    use chrono::TimeZone;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn submission(message: &str) -> ContactSubmission {
        let details = ContactForm::new("Jane Tan", "jane@example.com", "+65 9123 4567", message)
            .validate()
            .unwrap();
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        ContactSubmission::at(details, ts)
    }

    fn client(base_url: &str, api_key: Option<&str>) -> EmailClient {
        EmailClient::new(&EmailConfig {
            api_key: api_key.map(SecretString::from),
            api_url: base_url.to_string(),
            from: "Portfolio Contact <onboarding@resend.dev>".to_string(),
            to: "advisor@example.com".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_format_submitted_at_uses_singapore_time() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        assert_eq!(format_submitted_at(ts), "Monday, 19 October 2026 at 4:30 pm SGT");

        let late = Utc.with_ymd_and_hms(2026, 10, 19, 20, 5, 0).unwrap();
        assert_eq!(format_submitted_at(late), "Tuesday, 20 October 2026 at 4:05 am SGT");
    }

    #[test]
    fn test_render_converts_newlines_and_escapes() {
        let html = render_notification(
            &submission("Hello <b>there</b>\nSecond line"),
            DEFAULT_LOCATION,
        )
        .unwrap();

        assert!(html.contains("Hello &#60;b&#62;there&#60;/b&#62;<br/>Second line")
            || html.contains("Hello &lt;b&gt;there&lt;/b&gt;<br/>Second line"));
        assert!(!html.contains("<b>there</b>"));
        assert!(html.contains("mailto:jane@example.com"));
        assert!(html.contains("tel:+6591234567"));
        assert!(html.contains("Monday, 19 October 2026 at 4:30 pm SGT"));
        assert!(html.contains("Singapore"));
    }

    #[test]
    fn test_subject_collapses_whitespace() {
        assert_eq!(
            notification_subject("Jane\r\nTan"),
            "New Consultation Request from Jane Tan"
        );
    }

    #[tokio::test]
    async fn test_send_posts_bearer_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/emails"))
            .and(header("authorization", "Bearer re_test_key"))
            .and(body_partial_json(serde_json::json!({
                "to": ["advisor@example.com"],
                "subject": "New Consultation Request from Jane Tan",
                "reply_to": "jane@example.com",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "em_123"})))
            .expect(1)
            .mount(&server)
            .await;

        let sent = client(&server.uri(), Some("re_test_key"))
            .send_contact_notification(&submission("Hi"), DEFAULT_LOCATION)
            .await
            .unwrap();
        assert_eq!(sent.id.as_deref(), Some("em_123"));
    }

    #[tokio::test]
    async fn test_send_reports_api_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid from address"))
            .mount(&server)
            .await;

        let err = client(&server.uri(), Some("re_test_key"))
            .send_contact_notification(&submission("Hi"), DEFAULT_LOCATION)
            .await
            .unwrap_err();

        match err {
            EmailError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid from address");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_send_without_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server.uri(), None);
        assert!(!client.is_configured());

        let err = client
            .send_contact_notification(&submission("Hi"), DEFAULT_LOCATION)
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::NotConfigured));
    }
}
