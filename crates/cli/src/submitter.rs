//! Contact form submitter.
//!
//! Holds the four form fields and submits them to the contact endpoint.
//!
//! | Outcome | State | Fields | Notice |
//! |---|---|---|---|
//! | 2xx | `Success` | cleared | [`SUCCESS_NOTICE`] |
//! | non-2xx, network error, local check | `Error` | kept | failure notice with the fallback address |
//!
//! The busy flag is set for the duration of the request and cleared on
//! every path, including when the `submit` future is dropped mid-request.
//! There is no retry and no debouncing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use advisor_site_core::{ContactResponse, ErrorResponse, Phone, PhoneError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown after the server accepts a submission.
pub const SUCCESS_NOTICE: &str =
    "Thank you for your interest! I'll get back to you within 24 hours to schedule a consultation.";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Form status as shown to the visitor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

/// The four visitor-entered fields, posted as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormFields {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

impl ContactFormFields {
    /// Build a field set.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            message: message.into(),
        }
    }

    /// Whether every field is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.email, &self.phone, &self.message]
            .iter()
            .all(|v| v.is_empty())
    }

    /// Reset all fields to empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Checks the form controls enforce before anything is sent: every
    /// field is required and the phone must match the phone pattern.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn check(&self) -> Result<(), SubmitError> {
        let fields = [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("message", &self.message),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(SubmitError::Required(*field));
        }
        Phone::parse(&self.phone)?;
        Ok(())
    }
}

/// Why a submission ended in [`FormState::Error`].
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A required field is blank.
    #[error("{0} is required")]
    Required(&'static str),

    /// The phone does not match the form's pattern.
    #[error("Invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// The request could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}: {}", .error.as_deref().unwrap_or("no details"))]
    Rejected { status: u16, error: Option<String> },
}

/// Submits [`ContactFormFields`] to a contact endpoint.
pub struct FormSubmitter {
    client: reqwest::Client,
    endpoint: String,
    fallback_email: String,
    /// Current field values.
    pub fields: ContactFormFields,
    state: FormState,
    busy: Arc<AtomicBool>,
    notice: Option<String>,
    response: Option<ContactResponse>,
    last_error: Option<SubmitError>,
}

impl FormSubmitter {
    /// Create a submitter for `endpoint` (the full contact URL, e.g.
    /// `http://127.0.0.1:3000/api/contact`).
    ///
    /// `fallback_email` is quoted in the failure notice.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(
        endpoint: impl Into<String>,
        fallback_email: impl Into<String>,
    ) -> Result<Self, SubmitError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            fallback_email: fallback_email.into(),
            fields: ContactFormFields::default(),
            state: FormState::Idle,
            busy: Arc::new(AtomicBool::new(false)),
            notice: None,
            response: None,
            last_error: None,
        })
    }

    /// Replace the field values.
    #[must_use]
    pub fn with_fields(mut self, fields: ContactFormFields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    /// Whether a submission is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// A handle that reports the busy flag while `submit` holds the
    /// submitter.
    #[must_use]
    pub fn busy_handle(&self) -> BusyHandle {
        BusyHandle(Arc::clone(&self.busy))
    }

    /// Notice shown after the last submission.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Server acknowledgement from the last successful submission, when its
    /// body could be read.
    #[must_use]
    pub const fn response(&self) -> Option<&ContactResponse> {
        self.response.as_ref()
    }

    /// Cause of the last failed submission.
    #[must_use]
    pub const fn last_error(&self) -> Option<&SubmitError> {
        self.last_error.as_ref()
    }

    /// Failure notice quoting the fallback address.
    #[must_use]
    pub fn failure_notice(&self) -> String {
        format!(
            "There was an error sending your message. Please try again or email me directly at {}",
            self.fallback_email
        )
    }

    /// Submit the current fields and return the resulting state.
    ///
    /// If the returned future is dropped before completing, the submitter
    /// goes back to `Idle` with its fields untouched.
    pub async fn submit(&mut self) -> FormState {
        self.response = None;
        self.last_error = None;

        let outcome = {
            let _busy = BusyGuard::engage(&self.busy, &mut self.state);
            send(&self.client, &self.endpoint, &self.fields).await
        };

        match outcome {
            Ok(response) => {
                tracing::debug!(
                    id = response.as_ref().map_or("-", |r| r.id.as_str()),
                    "Contact form accepted"
                );
                self.state = FormState::Success;
                self.fields.clear();
                self.notice = Some(SUCCESS_NOTICE.to_string());
                self.response = response;
            }
            Err(err) => {
                tracing::warn!(error = %err, "Contact form submission failed");
                self.state = FormState::Error;
                self.notice = Some(self.failure_notice());
                self.last_error = Some(err);
            }
        }

        self.state
    }
}

/// Read-only view of a submitter's busy flag.
#[derive(Debug, Clone)]
pub struct BusyHandle(Arc<AtomicBool>);

impl BusyHandle {
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Holds the submitter busy for its lifetime.
struct BusyGuard<'a> {
    busy: &'a AtomicBool,
    state: &'a mut FormState,
}

impl<'a> BusyGuard<'a> {
    fn engage(busy: &'a AtomicBool, state: &'a mut FormState) -> Self {
        busy.store(true, Ordering::Release);
        *state = FormState::Submitting;
        Self { busy, state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        // Still `Submitting` here only if the request was abandoned
        if *self.state == FormState::Submitting {
            *self.state = FormState::Idle;
        }
    }
}

async fn send(
    client: &reqwest::Client,
    endpoint: &str,
    fields: &ContactFormFields,
) -> Result<Option<ContactResponse>, SubmitError> {
    fields.check()?;

    let response = client.post(endpoint).json(fields).send().await?;
    let status = response.status();

    if !status.is_success() {
        let error = response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.error);
        return Err(SubmitError::Rejected {
            status: status.as_u16(),
            error,
        });
    }

    // Any 2xx counts as accepted, even if the body is unreadable.
    Ok(response.json::<ContactResponse>().await.ok())
}
