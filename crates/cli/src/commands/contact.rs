//! Commands that talk to a running contact server.

use advisor_site_cli::{ContactFormFields, FormState, FormSubmitter, SubmitError};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContactError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Submission failed: {0}")]
    Failed(String),

    #[error("Server is not healthy (status {0})")]
    Unhealthy(u16),
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

fn url(base: &str, path: &str) -> String {
    format!("{}{path}", base.trim_end_matches('/'))
}

/// Submit one contact form to `{base}/api/contact`.
///
/// # Errors
///
/// Returns error if the form could not be delivered or the server rejected it.
pub async fn submit(
    base: &str,
    fallback_email: &str,
    fields: ContactFormFields,
) -> Result<(), ContactError> {
    let mut form =
        FormSubmitter::new(url(base, "/api/contact"), fallback_email)?.with_fields(fields);

    let state = form.submit().await;
    let notice = form.notice().unwrap_or_default().to_owned();

    if state != FormState::Success {
        let cause = form
            .last_error()
            .map_or_else(|| notice.clone(), ToString::to_string);
        tracing::error!(%cause, "Contact form was not accepted");
        return Err(ContactError::Failed(notice));
    }

    if let Some(response) = form.response() {
        tracing::info!(id = %response.id, "Submission accepted");
        if let Some(email_error) = &response.email_error {
            tracing::warn!(%email_error, "Notification email was not delivered");
        }
    }

    #[allow(clippy::print_stdout)]
    {
        println!("{notice}");
        if let Some(response) = form.response() {
            println!("id: {}", response.id);
        }
    }
    Ok(())
}

/// Check `{base}/health`.
///
/// # Errors
///
/// Returns error if the server is unreachable or not healthy.
pub async fn health(base: &str) -> Result<(), ContactError> {
    let response = reqwest::get(url(base, "/health")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ContactError::Unhealthy(status.as_u16()));
    }

    let body: HealthResponse = response.json().await?;
    #[allow(clippy::print_stdout)]
    {
        println!("{}", body.status);
    }
    Ok(())
}
