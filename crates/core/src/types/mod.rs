//! Core types for the advisor site.
//!
//! This module provides type-safe wrappers for the contact-form domain.

pub mod email;
pub mod id;
pub mod phone;
pub mod response;
pub mod submission;

pub use email::{Email, EmailError};
pub use id::SubmissionId;
pub use phone::{Phone, PhoneError};
pub use response::{ContactResponse, ErrorResponse};
pub use submission::{
    ContactDetails, ContactForm, ContactSubmission, DEFAULT_LOCATION, StoredSubmission,
    ValidationError,
};
