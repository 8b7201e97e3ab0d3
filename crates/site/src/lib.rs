//! Portfolio site library.
//!
//! This crate provides the portfolio website and its admin back office as a
//! library, allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod state;
