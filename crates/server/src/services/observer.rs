//! Diagnostic events emitted while a submission is processed.
//!
//! The handler reports what happened through a [`SubmissionObserver`] held
//! in application state. Production uses [`TracingObserver`]; tests swap in a
//! recorder and assert on the events instead of scraping log output.

use advisor_site_core::{SubmissionId, ValidationError};

/// One step of the per-request state machine.
#[derive(Debug, Clone, Copy)]
pub enum SubmissionEvent<'a> {
    /// The form failed validation; nothing was stored or sent.
    Rejected { reason: &'a ValidationError },
    /// The record was written to the key-value store.
    Stored { id: &'a SubmissionId },
    /// The notification email was accepted by the email API.
    Notified {
        id: &'a SubmissionId,
        message_id: Option<&'a str>,
    },
    /// The notification email failed; the submission is still accepted.
    NotifyFailed { id: &'a SubmissionId, error: &'a str },
    /// The request ended in a server error.
    Failed { error: &'a str },
}

impl SubmissionEvent<'_> {
    /// Short machine-readable name of the event.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Rejected { .. } => "rejected",
            Self::Stored { .. } => "stored",
            Self::Notified { .. } => "notified",
            Self::NotifyFailed { .. } => "notify_failed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Receives submission events.
pub trait SubmissionObserver: Send + Sync {
    fn observe(&self, event: &SubmissionEvent<'_>);
}

/// Emits every event as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SubmissionObserver for TracingObserver {
    fn observe(&self, event: &SubmissionEvent<'_>) {
        match *event {
            SubmissionEvent::Rejected { reason } => {
                tracing::info!(field = reason.field(), reason = %reason, "Contact submission rejected");
            }
            SubmissionEvent::Stored { id } => {
                tracing::info!(submission_id = %id, "Contact submission stored");
            }
            SubmissionEvent::Notified { id, message_id } => {
                tracing::info!(
                    submission_id = %id,
                    message_id = message_id.unwrap_or("-"),
                    "Contact notification delivered"
                );
            }
            SubmissionEvent::NotifyFailed { id, error } => {
                tracing::warn!(submission_id = %id, error, "Contact notification failed");
            }
            SubmissionEvent::Failed { error } => {
                tracing::error!(error, "Contact submission failed");
            }
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use recording::RecordingObserver;

#[cfg(any(test, feature = "test-util"))]
mod recording {
    use std::sync::{Arc, Mutex, PoisonError};

    use super::{SubmissionEvent, SubmissionObserver};

    /// Records event kinds in order, plus the field named by each
    /// rejection. Clones share the same log.
    #[derive(Debug, Clone, Default)]
    pub struct RecordingObserver {
        kinds: Arc<Mutex<Vec<&'static str>>>,
        rejected_fields: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RecordingObserver {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Event kinds observed so far.
        #[must_use]
        pub fn kinds(&self) -> Vec<&'static str> {
            self.kinds
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Field reported by each `rejected` event, in order.
        #[must_use]
        pub fn rejected_fields(&self) -> Vec<&'static str> {
            self.rejected_fields
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }
    }

    impl SubmissionObserver for RecordingObserver {
        fn observe(&self, event: &SubmissionEvent<'_>) {
            if let SubmissionEvent::Rejected { reason } = event {
                self.rejected_fields
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(reason.field());
            }
            self.kinds
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.kind());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        let id = SubmissionId::generate(chrono::Utc::now());

        observer.observe(&SubmissionEvent::Stored { id: &id });
        observer.observe(&SubmissionEvent::NotifyFailed {
            id: &id,
            error: "API error: 500",
        });

        assert_eq!(observer.kinds(), vec!["stored", "notify_failed"]);
    }

    #[test]
    fn test_tracing_observer_accepts_every_event() {
        let reason = ValidationError::InvalidEmail;
        TracingObserver.observe(&SubmissionEvent::Rejected { reason: &reason });
        TracingObserver.observe(&SubmissionEvent::Failed { error: "boom" });
    }
}
