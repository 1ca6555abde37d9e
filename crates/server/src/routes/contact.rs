//! Contact form route handler.
//!
//! Validates the submission, records it in the key-value store when one is
//! configured, then emails the advisor. Steps run strictly in that order and
//! each external call is attempted once.
//!
//! | Outcome | Status |
//! |---|---|
//! | accepted, email delivered | 200 |
//! | accepted, email failed (degraded delivery) | 200 + `email_error` |
//! | validation failure | 400 |
//! | missing email credential, storage failure | 500 |

use advisor_site_core::{ContactForm, ContactResponse, ContactSubmission};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::SubmissionEvent;
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str =
    "Thank you for your message! I'll get back to you within 24 hours.";
pub const DEGRADED_STORED_MESSAGE: &str =
    "Your message has been received and stored. However, email notification may be delayed.";
pub const DEGRADED_MESSAGE: &str =
    "Your message has been received. However, email notification may be delayed.";

/// Submit the contact form.
///
/// POST /contact
/// POST /api/contact
///
/// The body is read as JSON regardless of `Content-Type`, matching what the
/// page's `fetch` call sends.
#[instrument(skip_all)]
pub async fn submit(State(state): State<AppState>, body: Bytes) -> Response {
    let result = match serde_json::from_slice::<ContactForm>(&body) {
        Ok(form) => accept(&state, &form).await,
        Err(e) => {
            tracing::debug!(error = %e, "Unreadable contact form body");
            Err(AppError::BadRequest("Invalid request body".to_string()))
        }
    };

    match result {
        Ok(accepted) => Json(accepted).into_response(),
        Err(err) => {
            match &err {
                AppError::Validation(reason) => {
                    state.observer().observe(&SubmissionEvent::Rejected { reason });
                }
                AppError::BadRequest(_) => {}
                other => {
                    let error = other.to_string();
                    state.observer().observe(&SubmissionEvent::Failed { error: &error });
                }
            }
            err.to_response(Some(&state.config().fallback_email))
        }
    }
}

/// Run one submission through validate → persist → notify.
async fn accept(state: &AppState, form: &ContactForm) -> Result<ContactResponse> {
    let details = form.validate()?;

    if !state.email().is_configured() {
        return Err(AppError::Configuration(
            "RESEND_API_KEY is not set".to_string(),
        ));
    }

    let submission = ContactSubmission::new(details);
    let location = state.config().location.as_str();

    tracing::info!(
        submission_id = %submission.id,
        email = %submission.details.email,
        phone = %submission.details.phone,
        "Processing contact submission"
    );

    let stored = match state.store() {
        Some(store) => {
            let record = serde_json::to_value(submission.record(location))
                .map_err(|e| AppError::Internal(format!("failed to encode submission: {e}")))?;
            store.set(submission.id.as_str(), record).await?;
            state.observer().observe(&SubmissionEvent::Stored {
                id: &submission.id,
            });
            true
        }
        None => false,
    };

    let response = match state
        .email()
        .send_contact_notification(&submission, location)
        .await
    {
        Ok(sent) => {
            state.observer().observe(&SubmissionEvent::Notified {
                id: &submission.id,
                message_id: sent.id.as_deref(),
            });
            ContactResponse {
                success: true,
                message: SUCCESS_MESSAGE.to_string(),
                id: submission.id.to_string(),
                email_error: None,
            }
        }
        Err(err) => {
            let error = err.to_string();
            state.observer().observe(&SubmissionEvent::NotifyFailed {
                id: &submission.id,
                error: &error,
            });
            ContactResponse {
                success: true,
                message: if stored {
                    DEGRADED_STORED_MESSAGE
                } else {
                    DEGRADED_MESSAGE
                }
                .to_string(),
                id: submission.id.to_string(),
                email_error: Some(err.summary()),
            }
        }
    };

    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use advisor_site_core::ErrorResponse;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{EmailConfig, ServerConfig};
    use crate::db::{KeyValueStore, MemoryStore};
    use crate::services::RecordingObserver;

    struct Harness {
        app: axum::Router,
        store: MemoryStore,
        observer: RecordingObserver,
    }

    fn harness(email_api: &str, api_key: Option<&str>, store: MemoryStore) -> Harness {
        let config = ServerConfig {
            email: EmailConfig {
                api_key: api_key.map(SecretString::from),
                api_url: email_api.to_string(),
                ..EmailConfig::default()
            },
            fallback_email: "advisor@example.com".to_string(),
            ..ServerConfig::default()
        };
        let observer = RecordingObserver::new();
        let state = AppState::with_observer(
            config,
            Some(Arc::new(store.clone()) as Arc<dyn KeyValueStore>),
            Arc::new(observer.clone()),
        )
        .unwrap();

        Harness {
            app: crate::app(state),
            store,
            observer,
        }
    }

    async fn mock_email_api(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emails"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({"id": "em_1"})))
            .mount(&server)
            .await;
        server
    }

    async fn post(app: &axum::Router, uri: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn jane() -> Value {
        json!({
            "name": "Jane Tan",
            "email": "jane@example.com",
            "phone": "+65 9123 4567",
            "message": "Interested in retirement planning",
        })
    }

    #[tokio::test]
    async fn test_valid_submission_is_stored_and_notified() {
        let email_api = mock_email_api(200).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let (status, body) = post(&h.app, "/contact", &jane()).await;

        assert_eq!(status, StatusCode::OK);
        let accepted: ContactResponse = serde_json::from_value(body).unwrap();
        assert!(accepted.success);
        assert!(accepted.id.starts_with("contact_"));
        assert_eq!(accepted.message, SUCCESS_MESSAGE);
        assert!(!accepted.is_degraded());

        let record = h.store.get(&accepted.id).await.unwrap().unwrap();
        assert_eq!(record["name"], "Jane Tan");
        assert_eq!(record["location"], "Singapore");
        assert_eq!(h.observer.kinds(), vec!["stored", "notified"]);
    }

    #[tokio::test]
    async fn test_api_prefix_route_behaves_the_same() {
        let email_api = mock_email_api(200).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let (status, body) = post(&h.app, "/api/contact", &jane()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(h.store.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_field_is_rejected_without_side_effects() {
        let email_api = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&email_api)
            .await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        for field in ["name", "email", "phone", "message"] {
            let mut body = jane();
            body.as_object_mut().unwrap().remove(field);

            let (status, body) = post(&h.app, "/contact", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
            let err: ErrorResponse = serde_json::from_value(body).unwrap();
            assert_eq!(
                err.error,
                "All fields are required: name, email, phone, and message"
            );
        }

        assert!(h.store.is_empty());
        assert_eq!(h.observer.kinds(), vec!["rejected"; 4]);
        assert_eq!(
            h.observer.rejected_fields(),
            vec!["name", "email", "phone", "message"]
        );
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let email_api = mock_email_api(200).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let mut body = jane();
        body["email"] = json!("jane@@example");
        let (status, body) = post(&h.app, "/contact", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid email format"}));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_phone_is_rejected() {
        let email_api = mock_email_api(200).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let mut body = jane();
        body["phone"] = json!("abc123");
        let (status, body) = post(&h.app, "/contact", &body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid phone number format"}));
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_fails_before_any_io() {
        let email_api = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&email_api)
            .await;
        let h = harness(&email_api.uri(), None, MemoryStore::new());

        let (status, body) = post(&h.app, "/contact", &jane()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorResponse = serde_json::from_value(body).unwrap();
        assert!(err.error.contains("not configured"));
        assert!(err.error.contains("advisor@example.com"));
        assert!(h.store.is_empty());
        assert_eq!(h.observer.kinds(), vec!["failed"]);
    }

    #[tokio::test]
    async fn test_email_failure_is_degraded_delivery() {
        let email_api = mock_email_api(500).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let (status, body) = post(&h.app, "/contact", &jane()).await;

        assert_eq!(status, StatusCode::OK);
        let accepted: ContactResponse = serde_json::from_value(body).unwrap();
        assert!(accepted.success);
        assert_eq!(accepted.message, DEGRADED_STORED_MESSAGE);
        assert_eq!(
            accepted.email_error.as_deref(),
            Some("email service returned status 500")
        );
        assert!(h.store.get(&accepted.id).await.unwrap().is_some());
        assert_eq!(h.observer.kinds(), vec!["stored", "notify_failed"]);
    }

    #[tokio::test]
    async fn test_storage_failure_is_fatal_and_skips_email() {
        let email_api = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&email_api)
            .await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::failing());

        let (status, body) = post(&h.app, "/contact", &jane()).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let err: ErrorResponse = serde_json::from_value(body).unwrap();
        assert!(err.error.contains("unexpected error"));
        assert!(!err.error.contains("writes disabled"));
        assert_eq!(err.details.as_deref(), Some("submission could not be recorded"));
        assert_eq!(h.observer.kinds(), vec!["failed"]);
    }

    #[tokio::test]
    async fn test_identical_submissions_create_distinct_records() {
        let email_api = mock_email_api(200).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let (_, first) = post(&h.app, "/contact", &jane()).await;
        let (_, second) = post(&h.app, "/contact", &jane()).await;

        assert_ne!(first["id"], second["id"]);
        assert_eq!(h.store.len(), 2);
    }

    #[tokio::test]
    async fn test_unreadable_body_is_bad_request() {
        let email_api = mock_email_api(200).await;
        let h = harness(&email_api.uri(), Some("re_test_key"), MemoryStore::new());

        let request = Request::builder()
            .method("POST")
            .uri("/contact")
            .body(Body::from("name=Jane"))
            .unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(h.store.is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness("http://127.0.0.1:9", None, MemoryStore::new());

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = h.app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }
}
