//! Advisor site client tooling.
//!
//! The [`submitter`] module drives the contact endpoint the way the site's
//! contact form does: one POST per submission and a three-way outcome.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod submitter;

pub use submitter::{BusyHandle, ContactFormFields, FormState, FormSubmitter, SubmitError};
