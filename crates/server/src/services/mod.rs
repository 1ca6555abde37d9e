//! Business logic services for the contact handler.
//!
//! # Services
//!
//! - `email` - Notification delivery through the email API
//! - `observer` - Structured diagnostic events for each submission

pub mod email;
pub mod observer;

pub use email::{EmailClient, EmailError, SentEmail};
#[cfg(any(test, feature = "test-util"))]
pub use observer::RecordingObserver;
pub use observer::{SubmissionEvent, SubmissionObserver, TracingObserver};
