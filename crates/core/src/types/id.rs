//! Submission identifiers.

use core::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a stored contact submission.
///
/// Format: `contact_<RFC 3339 UTC timestamp, millisecond precision>_<UUID v4>`,
/// e.g. `contact_2026-10-19T08:30:00.123Z_6f1c…`. The UUID suffix makes two
/// submissions in the same millisecond distinct; collisions beyond that are
/// not handled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Prefix shared by every submission identifier.
    pub const PREFIX: &'static str = "contact_";

    /// Generate a new identifier for a submission created at `timestamp`.
    #[must_use]
    pub fn generate(timestamp: DateTime<Utc>) -> Self {
        Self(format!(
            "{}{}_{}",
            Self::PREFIX,
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            Uuid::new_v4()
        ))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SubmissionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
