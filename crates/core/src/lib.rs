//! Portfolio Core - Shared types library.
//!
//! This crate provides common types used across the portfolio workspace:
//! - `site` - Public portfolio page and the admin back office
//! - `integration-tests` - End-to-end tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no session
//! handling. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for entity IDs, emails and one-time codes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
