//! Core types for the portfolio site.
//!
//! This module provides type-safe wrappers for the values that cross the
//! admin sign-in flow and the portfolio REST API.

pub mod email;
pub mod id;
pub mod otp;

pub use email::{Email, EmailError};
pub use id::*;
pub use otp::{OtpCode, OtpCodeError};
