//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. Client errors carry their reason; server
//! errors answer with a generic message and a short diagnostic, never the
//! underlying error text.

use advisor_site_core::{ErrorResponse, ValidationError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::StoreError;

/// Application-level error type for the contact handler.
#[derive(Debug, Error)]
pub enum AppError {
    /// The submitted form is incomplete or malformed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The request body could not be read as a contact form.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Deployment misconfiguration, e.g. a missing credential.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Key-value store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Storage(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Build the JSON error response.
    ///
    /// `fallback_email` is quoted to the visitor on server errors so they can
    /// reach the advisor directly.
    #[must_use]
    pub fn to_response(&self, fallback_email: Option<&str>) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let contact_hint = fallback_email
            .map(|address| format!(" or email directly at {address}"))
            .unwrap_or_default();

        // Don't expose internal error details to clients
        let body = match self {
            Self::Validation(err) => ErrorResponse {
                error: err.to_string(),
                details: None,
            },
            Self::BadRequest(message) => ErrorResponse {
                error: message.clone(),
                details: None,
            },
            Self::Configuration(_) => ErrorResponse {
                error: fallback_email.map_or_else(
                    || "Email service not configured. Please contact directly via email.".to_string(),
                    |address| {
                        format!(
                            "Email service not configured. Please contact directly via email at {address}."
                        )
                    },
                ),
                details: None,
            },
            Self::Storage(_) => ErrorResponse {
                error: format!(
                    "An unexpected error occurred. Please try again later{contact_hint}."
                ),
                details: Some("submission could not be recorded".to_string()),
            },
            Self::Internal(_) => ErrorResponse {
                error: format!(
                    "An unexpected error occurred. Please try again later{contact_hint}."
                ),
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_response(None)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::Validation(ValidationError::InvalidEmail);
        assert_eq!(err.to_string(), "Validation error: Invalid email format");

        let err = AppError::Configuration("RESEND_API_KEY is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: RESEND_API_KEY is not set"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::Validation(ValidationError::InvalidPhone)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Configuration("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Storage(StoreError::Unavailable("down".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body_carries_reason() {
        let body = body_of(AppError::Validation(ValidationError::InvalidEmail).into_response()).await;
        assert_eq!(body.error, "Invalid email format");
        assert_eq!(body.details, None);
    }

    #[tokio::test]
    async fn test_configuration_body_wording() {
        let err = AppError::Configuration("RESEND_API_KEY is not set".to_string());

        let body = body_of(err.to_response(None)).await;
        assert_eq!(
            body.error,
            "Email service not configured. Please contact directly via email."
        );

        let body = body_of(err.to_response(Some("advisor@example.com"))).await;
        assert_eq!(
            body.error,
            "Email service not configured. Please contact directly via email at advisor@example.com."
        );
        assert!(!body.error.contains("RESEND_API_KEY"));
    }

    #[tokio::test]
    async fn test_server_error_body_hides_internals() {
        let err = AppError::Storage(StoreError::Unavailable("password=hunter2".to_string()));
        let body = body_of(err.to_response(Some("advisor@example.com"))).await;

        assert!(body.error.contains("advisor@example.com"));
        assert!(!body.error.contains("hunter2"));
        assert_eq!(body.details.as_deref(), Some("submission could not be recorded"));
    }
}
