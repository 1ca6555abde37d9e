//! Advisor Site Core - Shared types library.
//!
//! This crate provides the contact-submission domain used by every component:
//! - `server` - HTTP submission handler
//! - `cli` - Form submitter and maintenance commands
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP clients. Every transport adapter validates through
//! [`ContactForm::validate`], so the rule set lives in exactly one place.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, phone numbers, submission IDs,
//!   and the submission entity itself

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
