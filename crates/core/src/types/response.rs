//! JSON bodies returned by the contact endpoint.
//!
//! Shared by the server (which produces them) and the form submitter (which
//! reads them).

use serde::{Deserialize, Serialize};

/// Body of a `200 OK` contact response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub id: String,
    /// Present only when the submission was accepted but the notification
    /// email could not be delivered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_error: Option<String>,
}

impl ContactResponse {
    /// Whether the notification email failed after the submission was
    /// accepted.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.email_error.is_some()
    }
}

/// Body of a `4xx`/`5xx` contact response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_error_omitted_when_delivered() {
        let body = ContactResponse {
            success: true,
            message: "ok".to_string(),
            id: "contact_x".to_string(),
            email_error: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("email_error").is_none());
        assert!(!body.is_degraded());
    }

    #[test]
    fn test_error_response_without_details() {
        let json = serde_json::to_string(&ErrorResponse {
            error: "Invalid email format".to_string(),
            details: None,
        })
        .unwrap();
        assert_eq!(json, r#"{"error":"Invalid email format"}"#);
    }
}
