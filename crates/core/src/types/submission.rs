//! Contact submission entity and its validation routine.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, Phone, SubmissionId};

/// Location recorded alongside every stored submission.
pub const DEFAULT_LOCATION: &str = "Singapore";

/// Reasons a contact form is rejected before any side effect happens.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("All fields are required: name, email, phone, and message")]
    MissingField(&'static str),

    /// The email does not match `local@domain.tld`.
    #[error("Invalid email format")]
    InvalidEmail,

    /// The phone contains characters other than digits, spaces, hyphens and
    /// a leading `+`.
    #[error("Invalid phone number format")]
    InvalidPhone,
}

impl ValidationError {
    /// Name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingField(field) => field,
            Self::InvalidEmail => "email",
            Self::InvalidPhone => "phone",
        }
    }
}

/// Raw contact form body as posted by the page.
///
/// Every field is optional at the serde level so that an absent or `null`
/// field surfaces as [`ValidationError::MissingField`] instead of a JSON
/// rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactForm {
    /// Build a form with all four fields present.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            email: Some(email.into()),
            phone: Some(phone.into()),
            message: Some(message.into()),
        }
    }

    /// Validate the form.
    ///
    /// Checks run in a fixed order: presence of all four fields, then email
    /// format, then phone format. A whitespace-only value counts as absent;
    /// otherwise values are checked and kept exactly as submitted.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    pub fn validate(&self) -> Result<ContactDetails, ValidationError> {
        let name = required("name", self.name.as_deref())?;
        let email = required("email", self.email.as_deref())?;
        let phone = required("phone", self.phone.as_deref())?;
        let message = required("message", self.message.as_deref())?;

        let email = Email::parse(email).map_err(|_| ValidationError::InvalidEmail)?;
        let phone = Phone::parse(phone).map_err(|_| ValidationError::InvalidPhone)?;

        Ok(ContactDetails {
            name: name.to_owned(),
            email,
            phone,
            message: message.to_owned(),
        })
    }
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// The four visitor-supplied fields after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub message: String,
}

/// A validated submission with its generated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub id: SubmissionId,
    pub timestamp: DateTime<Utc>,
    pub details: ContactDetails,
}

impl ContactSubmission {
    /// Stamp validated details with the current time, truncated to
    /// milliseconds, and a fresh identifier.
    #[must_use]
    pub fn new(details: ContactDetails) -> Self {
        Self::at(details, Utc::now().trunc_subsecs(3))
    }

    /// Stamp validated details with a given creation time.
    #[must_use]
    pub fn at(details: ContactDetails, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: SubmissionId::generate(timestamp),
            timestamp,
            details,
        }
    }

    /// The record written to the key-value store under [`Self::id`].
    #[must_use]
    pub fn record(&self, location: &str) -> StoredSubmission {
        StoredSubmission {
            name: self.details.name.clone(),
            email: self.details.email.clone(),
            phone: self.details.phone.clone(),
            message: self.details.message.clone(),
            timestamp: self.timestamp,
            location: location.to_owned(),
        }
    }
}

/// Persisted shape of a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub message: String,
    #[serde(with = "rfc3339_millis")]
    pub timestamp: DateTime<Utc>,
    pub location: String,
}

/// Timestamps as `2026-10-19T08:30:00.000Z`, the same form used in ids.
mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        DateTime::<Utc>::deserialize(d)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn jane() -> ContactForm {
        ContactForm::new(
            "Jane Tan",
            "jane@example.com",
            "+65 9123 4567",
            "Interested in retirement planning",
        )
    }

    #[test]
    fn test_validate_accepts_complete_form() {
        let details = jane().validate().unwrap();
        assert_eq!(details.name, "Jane Tan");
        assert_eq!(details.email.as_str(), "jane@example.com");
        assert_eq!(details.phone.as_str(), "+65 9123 4567");
    }

    #[test]
    fn test_validate_reports_each_missing_field() {
        let cases: [(&str, fn(&mut ContactForm)); 4] = [
            ("name", |f| f.name = None),
            ("email", |f| f.email = Some(String::new())),
            ("phone", |f| f.phone = Some("   ".to_string())),
            ("message", |f| f.message = None),
        ];

        for (field, strip) in cases {
            let mut form = jane();
            strip(&mut form);
            assert_eq!(form.validate(), Err(ValidationError::MissingField(field)));
        }
    }

    #[test]
    fn test_presence_checked_before_format() {
        let mut form = jane();
        form.email = Some("not-an-email".to_string());
        form.message = None;
        assert_eq!(form.validate(), Err(ValidationError::MissingField("message")));
    }

    #[test]
    fn test_email_checked_before_phone() {
        let mut form = jane();
        form.email = Some("jane@@example".to_string());
        form.phone = Some("abc123".to_string());
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_invalid_phone() {
        let mut form = jane();
        form.phone = Some("abc123".to_string());
        let err = form.validate().unwrap_err();
        assert_eq!(err, ValidationError::InvalidPhone);
        assert_eq!(err.field(), "phone");
        assert_eq!(err.to_string(), "Invalid phone number format");
    }

    #[test]
    fn test_padded_email_is_invalid() {
        let mut form = jane();
        form.email = Some(" jane@example.com ".to_string());
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_leading_space_phone_is_invalid() {
        let mut form = jane();
        form.phone = Some(" +65 9123 4567".to_string());
        assert_eq!(form.validate(), Err(ValidationError::InvalidPhone));
    }

    #[test]
    fn test_values_are_kept_as_submitted() {
        let form = ContactForm::new(
            "  Jane Tan ",
            "jane@example.com",
            "+65 9123 4567 ",
            "\nLine one\nLine two\n",
        );
        let details = form.validate().unwrap();
        assert_eq!(details.name, "  Jane Tan ");
        assert_eq!(details.phone.as_str(), "+65 9123 4567 ");
        assert_eq!(details.message, "\nLine one\nLine two\n");
    }

    #[test]
    fn test_deserialize_null_and_absent_fields() {
        let form: ContactForm =
            serde_json::from_str(r#"{"name": null, "email": "jane@example.com"}"#).unwrap();
        assert_eq!(form.validate(), Err(ValidationError::MissingField("name")));
    }

    #[test]
    fn test_record_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();
        let submission = ContactSubmission::at(jane().validate().unwrap(), ts);
        let value = serde_json::to_value(submission.record(DEFAULT_LOCATION)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "name": "Jane Tan",
                "email": "jane@example.com",
                "phone": "+65 9123 4567",
                "message": "Interested in retirement planning",
                "timestamp": "2026-10-19T08:30:00.000Z",
                "location": "Singapore",
            })
        );
        assert!(submission.id.as_str().starts_with("contact_2026-10-19T08:30:00.000Z_"));
    }

    #[test]
    fn test_identical_submissions_get_distinct_ids() {
        let a = ContactSubmission::new(jane().validate().unwrap());
        let b = ContactSubmission::new(jane().validate().unwrap());
        assert_ne!(a.id, b.id);
    }
}
