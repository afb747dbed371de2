//! Mailmirror Core - Shared types library.
//!
//! This crate provides common types used by the mailmirror server:
//! type-safe entity IDs, the `Email` address type, and the closed enums
//! MailChimp defines for lists and members.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
